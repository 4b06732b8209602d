use chrono::Utc;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{error, info, warn};

use crate::da::BlobClient;
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::types::{BlobSubmission, RunSummary, SubmitOptions, Verification};
use crate::utils::blob_payload;

/// How many blobs to send and how to pace them.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub blob_count: u32,
    /// Pause between consecutive submissions.
    pub interval: Duration,
    /// Wall-clock bound for the whole session.
    pub deadline: Instant,
}

impl RunPlan {
    #[cfg(test)]
    pub fn new(blob_count: u32, interval: Duration, timeout: Duration) -> Self {
        Self::with_deadline(blob_count, interval, Instant::now() + timeout)
    }

    /// Shares a deadline that was already running, e.g. during client setup.
    pub fn with_deadline(blob_count: u32, interval: Duration, deadline: Instant) -> Self {
        Self {
            blob_count,
            interval,
            deadline,
        }
    }
}

/// Submits `plan.blob_count` blobs one after another, reading each back.
///
/// A failed submission aborts the run. A failed or mismatching read-back is
/// reported through `on_report` and the run carries on.
pub async fn run_submissions<C, F>(
    client: &C,
    namespace: &Namespace,
    options: &SubmitOptions,
    plan: &RunPlan,
    mut on_report: F,
) -> Result<RunSummary>
where
    C: BlobClient + ?Sized,
    F: FnMut(&BlobSubmission, Option<&Error>),
{
    let mut summary = RunSummary {
        namespace: namespace.to_string(),
        ..RunSummary::default()
    };

    info!(count = plan.blob_count, %namespace, "📤 Submitting blobs to Celestia");

    for sequence in 1..=plan.blob_count {
        let mut blob = BlobSubmission::new(sequence, blob_payload(sequence, Utc::now()));

        let submitted = timeout_at(
            plan.deadline,
            client.submit(&blob.payload, namespace, options),
        )
        .await
        .unwrap_or_else(|_| Err(anyhow::anyhow!("session deadline elapsed")));

        let receipt = match submitted {
            Ok(receipt) => receipt,
            Err(cause) => {
                error!(sequence, "❌ Submission failed: {cause:#}");
                return Err(Error::SubmitFailed { sequence, cause });
            }
        };
        info!(sequence, height = receipt.height, commitment = %receipt.commitment, "✓ Blob submitted");
        blob.height = Some(receipt.height);
        blob.commitment = Some(receipt.commitment.clone());

        let retrieved = timeout_at(
            plan.deadline,
            client.retrieve(receipt.height, namespace, &receipt.commitment),
        )
        .await
        .unwrap_or_else(|_| Err(anyhow::anyhow!("session deadline elapsed")));

        let warning = match retrieved {
            Ok(data) if data == blob.payload => {
                info!(sequence, "✓ Verified: {}", String::from_utf8_lossy(&data));
                blob.verification = Some(Verification::Matched);
                None
            }
            Ok(data) => {
                warn!(
                    sequence,
                    expected = blob.payload.len(),
                    got = data.len(),
                    "Retrieved blob does not match what was submitted"
                );
                blob.verification = Some(Verification::Mismatch);
                Some(Error::VerifyFailed {
                    sequence,
                    reason: "retrieved data does not match submitted payload".into(),
                })
            }
            Err(e) => {
                warn!(sequence, "Could not verify blob: {e:#}");
                let reason = format!("{e:#}");
                blob.verification = Some(Verification::Unavailable(reason.clone()));
                Some(Error::VerifyFailed { sequence, reason })
            }
        };

        summary.record(&blob);
        on_report(&blob, warning.as_ref());

        if sequence < plan.blob_count {
            sleep(plan.interval).await;
        }
    }

    info!(
        submitted = summary.submitted,
        verified = summary.verified,
        "🎉 All {} blobs submitted",
        summary.submitted
    );
    Ok(summary)
}
