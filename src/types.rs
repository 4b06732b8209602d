use serde::Serialize;
use std::fmt;

/// Opaque content commitment returned when a blob is built for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment(pub Vec<u8>);

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// What the network reports back for a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub height: u64,
    pub commitment: Commitment,
}

/// Fee and gas settings passed with every submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitOptions {
    /// Address that pays fees on the signer's behalf.
    pub fee_granter: Option<String>,
    pub gas_price: Option<f64>,
    pub gas_limit: Option<u64>,
}

/// Outcome of reading a blob back after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Matched,
    Mismatch,
    /// Retrieval failed; the submission itself still stands.
    Unavailable(String),
}

/// One iteration of the submit loop. Reported once, then dropped.
#[derive(Debug, Clone)]
pub struct BlobSubmission {
    pub sequence: u32,
    pub payload: Vec<u8>,
    pub commitment: Option<Commitment>,
    /// Set only once the submit step succeeded.
    pub height: Option<u64>,
    pub verification: Option<Verification>,
}

impl BlobSubmission {
    pub fn new(sequence: u32, payload: Vec<u8>) -> Self {
        Self {
            sequence,
            payload,
            commitment: None,
            height: None,
            verification: None,
        }
    }

    /// `None` unless the blob was submitted and read back.
    pub fn verified(&self) -> Option<bool> {
        self.height?;
        match self.verification.as_ref()? {
            Verification::Matched => Some(true),
            Verification::Mismatch => Some(false),
            Verification::Unavailable(_) => None,
        }
    }
}

/// Totals for a run that submitted every blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub namespace: String,
    pub submitted: u32,
    pub verified: u32,
    pub mismatched: u32,
    pub unverified: u32,
    pub heights: Vec<u64>,
}

impl RunSummary {
    pub(crate) fn record(&mut self, blob: &BlobSubmission) {
        if let Some(height) = blob.height {
            self.submitted += 1;
            self.heights.push(height);
        }
        match blob.verified() {
            Some(true) => self.verified += 1,
            Some(false) => self.mismatched += 1,
            None => self.unverified += 1,
        }
    }
}
