//! Table and JSON rendering of snapshots.

use crate::summary::{Sentiment, Snapshot};
use colored::{ColoredString, Colorize};

const TLDR_WIDTH: usize = 60;
const SENTIMENT_WIDTH: usize = 9;
// Emoji cells render two columns wide.
const REC_WIDTH: usize = 4;
const EMOJI_WIDTH: usize = 2;

/// Pretty JSON array of snapshots
pub fn render_json(snapshots: &[Snapshot]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshots)
}

/// Human-readable table of snapshots for `game`
pub fn render_table(game: &str, snapshots: &[Snapshot]) -> String {
    if snapshots.is_empty() {
        return "No reviews found.".yellow().to_string();
    }

    let author_width = snapshots
        .iter()
        .map(|s| s.author().chars().count())
        .chain(std::iter::once("Author".len()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format!("Steam Snapshots for {}", game).bold()));
    out.push_str(&format!(
        "{:<rec$}  {:<sent$}  {:<tldr$}  {}\n",
        "Rec?",
        "Sentiment",
        "TL;DR",
        "Author",
        rec = REC_WIDTH,
        sent = SENTIMENT_WIDTH,
        tldr = TLDR_WIDTH,
    ));
    out.push_str(&format!(
        "{}\n",
        "━".repeat(REC_WIDTH + SENTIMENT_WIDTH + TLDR_WIDTH + author_width + 6)
    ));

    for snapshot in snapshots {
        let (rec, label, text) = match snapshot {
            Snapshot::Summary {
                summary,
                recommended,
                ..
            } => {
                let rec = if *recommended { "✅" } else { "❌" };
                (rec, sentiment_cell(summary.sentiment), summary.tldr.as_str())
            }
            Snapshot::Error { error, .. } => {
                ("⚠️", format!("{:<w$}", "error", w = SENTIMENT_WIDTH).red(), error.as_str())
            }
        };

        let lines = wrap(text, TLDR_WIDTH);
        let rec_pad = " ".repeat(REC_WIDTH - EMOJI_WIDTH);
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!(
                    "{}{}  {}  {:<tldr$}  {}\n",
                    rec,
                    rec_pad,
                    label,
                    line,
                    snapshot.author(),
                    tldr = TLDR_WIDTH,
                ));
            } else {
                out.push_str(&format!(
                    "{:<rec$}  {:<sent$}  {}\n",
                    "",
                    "",
                    line,
                    rec = REC_WIDTH,
                    sent = SENTIMENT_WIDTH,
                ));
            }
        }
    }

    out
}

fn sentiment_cell(sentiment: Sentiment) -> ColoredString {
    let padded = format!("{:<w$}", sentiment.as_str(), w = SENTIMENT_WIDTH);
    match sentiment {
        Sentiment::Pos => padded.green().bold(),
        Sentiment::Neg => padded.red().bold(),
        Sentiment::Mixed => padded.yellow().bold(),
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
