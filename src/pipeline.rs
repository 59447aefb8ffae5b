//! Turns fetched reviews into snapshots, one review at a time.

use crate::agent::{Generate, Summariser};
use crate::storage::ReviewCache;
use crate::summary::{Review, Snapshot};
use tracing::{debug, warn};

/// Summarise `reviews` in order, consulting and filling `cache` when given.
///
/// A review that cannot be summarised becomes an error snapshot; the rest of
/// the batch carries on. `on_progress` is called with the number of reviews
/// done so far.
pub async fn summarise_reviews<G: Generate>(
    reviews: &[Review],
    summariser: &Summariser<G>,
    mut cache: Option<&mut ReviewCache>,
    mut on_progress: impl FnMut(usize),
) -> Vec<Snapshot> {
    let mut snapshots = Vec::with_capacity(reviews.len());

    for (index, review) in reviews.iter().enumerate() {
        let cached = cache.as_deref().and_then(|c| c.get(&review.text)).cloned();

        let snapshot = match cached {
            Some(summary) => {
                debug!(author = %review.author, source = "cache", ?summary, "summary ready");
                Snapshot::from_summary(summary, review)
            }
            None => match summariser.summarise(&review.text).await {
                Ok(summary) => {
                    debug!(author = %review.author, source = "llm", ?summary, "summary ready");
                    if let Some(cache) = cache.as_deref_mut() {
                        cache.insert(&review.text, summary.clone());
                    }
                    Snapshot::from_summary(summary, review)
                }
                Err(err) => {
                    warn!(author = %review.author, error = %err, "could not summarise review");
                    Snapshot::from_error(err, review)
                }
            },
        };

        snapshots.push(snapshot);
        on_progress(index + 1);
    }

    snapshots
}
