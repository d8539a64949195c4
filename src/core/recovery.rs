//! Dictionary-based recovery of HMAC signing secrets.
//!
//! Given a token whose header names an HMAC algorithm, candidate secrets
//! are streamed from a [`CandidateSource`] and each one is checked
//! against the token signature until one matches. The wordlist is never
//! opened for non-symmetric tokens.
//!
//! With one worker the search is strictly sequential and returns the
//! first matching line in source order. With several workers one reader
//! feeds batches to a pool of scoped threads and the first worker to
//! find a match wins. In that mode *a* matching secret is returned, not
//! necessarily the earliest one in the file.

use std::fmt;
use std::io;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use serde_json::Value;
use zeroize::Zeroizing;

use crate::core::decoder::{DecodedToken, JsonObject, split_token};
use crate::core::signature::{self, AlgorithmFamily, HmacAlgorithm};
use crate::core::wordlist::CandidateSource;
use crate::error::JwtAuditError;

/// Algorithm assumed for trials when the header carries no `alg`.
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Candidates handed to a worker at a time in parallel mode.
const BATCH_SIZE: usize = 256;

/// Why no candidate was tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The algorithm is not HMAC-based.
    NonSymmetric,
    /// `HS`-prefixed, but not HS256, HS384 or HS512.
    UnsupportedHmacVariant,
    /// The token has no signature bytes to match against.
    Unsigned,
    /// The raw token did not split into three segments.
    Malformed,
    /// Recovery was turned off by the caller.
    Disabled,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NonSymmetric => "non_symmetric_algorithm",
            SkipReason::UnsupportedHmacVariant => "unsupported_hmac_variant",
            SkipReason::Unsigned => "unsigned_token",
            SkipReason::Malformed => "malformed_token",
            SkipReason::Disabled => "disabled",
        }
    }
}

/// Result of a secret recovery attempt.
pub enum RecoveryOutcome {
    /// No candidate was tried.
    Skipped {
        algorithm: String,
        reason: SkipReason,
    },
    /// A candidate produced the token's exact signature.
    Recovered {
        secret: Zeroizing<String>,
        claims: JsonObject,
        attempts: u64,
    },
    /// The source was exhausted without a match.
    NotFound { attempts: u64 },
    /// The source could not be opened or read.
    Unavailable { cause: JwtAuditError },
    /// The caller's cancellation flag or deadline stopped the search.
    Cancelled { attempts: u64 },
}

impl RecoveryOutcome {
    pub(crate) fn disabled(alg: Option<&str>) -> Self {
        RecoveryOutcome::Skipped {
            algorithm: alg.unwrap_or(DEFAULT_ALGORITHM).to_string(),
            reason: SkipReason::Disabled,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, RecoveryOutcome::Recovered { .. })
    }

    /// The recovered secret, if any.
    pub fn secret(&self) -> Option<&str> {
        match self {
            RecoveryOutcome::Recovered { secret, .. } => Some(secret.as_str()),
            _ => None,
        }
    }

    /// Short machine-friendly name of the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryOutcome::Skipped { .. } => "skipped",
            RecoveryOutcome::Recovered { .. } => "recovered",
            RecoveryOutcome::NotFound { .. } => "not-found",
            RecoveryOutcome::Unavailable { .. } => "unavailable",
            RecoveryOutcome::Cancelled { .. } => "cancelled",
        }
    }
}

/// Custom `Debug` that redacts the recovered secret and claims.
impl fmt::Debug for RecoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryOutcome::Skipped { algorithm, reason } => f
                .debug_struct("Skipped")
                .field("algorithm", algorithm)
                .field("reason", reason)
                .finish(),
            RecoveryOutcome::Recovered { attempts, .. } => f
                .debug_struct("Recovered")
                .field("secret", &"[REDACTED]")
                .field("claims", &"[REDACTED]")
                .field("attempts", attempts)
                .finish(),
            RecoveryOutcome::NotFound { attempts } => f
                .debug_struct("NotFound")
                .field("attempts", attempts)
                .finish(),
            RecoveryOutcome::Unavailable { cause } => f
                .debug_struct("Unavailable")
                .field("cause", cause)
                .finish(),
            RecoveryOutcome::Cancelled { attempts } => f
                .debug_struct("Cancelled")
                .field("attempts", attempts)
                .finish(),
        }
    }
}

/// A shared flag a caller can raise to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How a recovery run is executed.
#[derive(Debug, Clone)]
pub struct RecoveryOptions {
    /// Worker threads; `0` and `1` both mean sequential.
    pub workers: usize,
    /// Stop trying candidates once this instant has passed.
    pub deadline: Option<Instant>,
    pub cancel: CancellationFlag,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            deadline: None,
            cancel: CancellationFlag::new(),
        }
    }
}

impl RecoveryOptions {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// What a single search needs to check one candidate.
#[derive(Clone, Copy)]
struct Target<'a> {
    algorithm: HmacAlgorithm,
    signing_input: &'a [u8],
    signature: &'a [u8],
}

impl Target<'_> {
    fn matches(&self, candidate: &str) -> bool {
        self.algorithm
            .verify(self.signing_input, self.signature, candidate.as_bytes())
    }
}

/// Try to recover the HMAC secret of `token` from `source`.
///
/// `decoded` must be the decoded form of `token`. The source is only
/// opened when the header names a supported HMAC algorithm and the
/// token carries a signature. Claim validity (`exp`, `nbf`) plays no
/// part: a candidate wins purely on signature match.
pub fn recover_secret<S: CandidateSource>(
    token: &str,
    decoded: &DecodedToken,
    source: S,
    options: &RecoveryOptions,
) -> RecoveryOutcome {
    let algorithm = match decoded.header.get("alg") {
        None | Some(Value::Null) => DEFAULT_ALGORITHM.to_string(),
        Some(Value::String(alg)) => alg.clone(),
        Some(other) => other.to_string(),
    };

    let hmac = match signature::classify(&algorithm) {
        AlgorithmFamily::Hmac(hmac) => hmac,
        AlgorithmFamily::UnsupportedHmac => {
            return skipped(algorithm, SkipReason::UnsupportedHmacVariant);
        }
        AlgorithmFamily::NonSymmetric => return skipped(algorithm, SkipReason::NonSymmetric),
    };

    let Some(signature) = decoded.signature.bytes() else {
        return skipped(algorithm, SkipReason::Unsigned);
    };
    let Ok(parts) = split_token(token) else {
        return skipped(algorithm, SkipReason::Malformed);
    };

    let label = source.label();
    let candidates = match source.open() {
        Ok(candidates) => candidates,
        Err(cause) => {
            tracing::warn!(wordlist = %label, "wordlist unavailable, skipping secret recovery");
            return RecoveryOutcome::Unavailable { cause };
        }
    };

    let target = Target {
        algorithm: hmac,
        signing_input: parts.signing_input().as_bytes(),
        signature,
    };
    let workers = options.workers.max(1);
    tracing::debug!(algorithm = hmac.name(), workers, wordlist = %label, "starting secret recovery");

    let search = if workers == 1 {
        search_sequential(target, candidates, options)
    } else {
        search_parallel(target, candidates, options, workers)
    };

    let outcome = match search {
        Search::Hit { secret, attempts } => RecoveryOutcome::Recovered {
            secret,
            claims: decoded.payload.clone(),
            attempts,
        },
        Search::Exhausted { attempts } => RecoveryOutcome::NotFound { attempts },
        Search::Interrupted { attempts } => RecoveryOutcome::Cancelled { attempts },
        Search::ReadFailed { source } => RecoveryOutcome::Unavailable {
            cause: JwtAuditError::WordlistUnavailable {
                path: label,
                source,
            },
        },
    };
    tracing::debug!(outcome = outcome.label(), "secret recovery finished");
    outcome
}

fn skipped(algorithm: String, reason: SkipReason) -> RecoveryOutcome {
    tracing::debug!(%algorithm, ?reason, "secret recovery skipped");
    RecoveryOutcome::Skipped { algorithm, reason }
}

enum Search {
    Hit {
        secret: Zeroizing<String>,
        attempts: u64,
    },
    Exhausted {
        attempts: u64,
    },
    Interrupted {
        attempts: u64,
    },
    ReadFailed {
        source: io::Error,
    },
}

/// Trim a raw line; `None` for lines that are not a trial.
fn candidate(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn search_sequential<I>(target: Target<'_>, candidates: I, options: &RecoveryOptions) -> Search
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut attempts = 0u64;
    for line in candidates {
        let line = match line {
            Ok(line) => Zeroizing::new(line),
            Err(source) => return Search::ReadFailed { source },
        };
        let Some(secret) = candidate(&line) else {
            continue;
        };
        if options.should_stop() {
            return Search::Interrupted { attempts };
        }
        attempts += 1;
        if target.matches(secret) {
            return Search::Hit {
                secret: Zeroizing::new(secret.to_string()),
                attempts,
            };
        }
    }
    Search::Exhausted { attempts }
}

fn search_parallel<I>(
    target: Target<'_>,
    candidates: I,
    options: &RecoveryOptions,
    workers: usize,
) -> Search
where
    I: Iterator<Item = io::Result<String>>,
{
    let found = AtomicBool::new(false);
    let interrupted = AtomicBool::new(false);
    let attempts = AtomicU64::new(0);

    let (hit, read_error) = std::thread::scope(|scope| {
        let (batch_tx, batch_rx) =
            crossbeam_channel::bounded::<Vec<Zeroizing<String>>>(workers * 2);
        let (hit_tx, hit_rx) = crossbeam_channel::bounded::<Zeroizing<String>>(1);

        for worker in 0..workers {
            let batch_rx = batch_rx.clone();
            let hit_tx = hit_tx.clone();
            let (found, interrupted, attempts) = (&found, &interrupted, &attempts);
            scope.spawn(move || {
                for batch in batch_rx.iter() {
                    for secret in batch.iter() {
                        if found.load(Ordering::Acquire) {
                            return;
                        }
                        if options.should_stop() {
                            interrupted.store(true, Ordering::Release);
                            return;
                        }
                        attempts.fetch_add(1, Ordering::Relaxed);
                        if target.matches(secret) {
                            found.store(true, Ordering::Release);
                            tracing::debug!(worker, "worker found matching secret");
                            // Capacity one: only the first winner's send lands.
                            let _ = hit_tx.try_send(secret.clone());
                            return;
                        }
                    }
                }
            });
        }
        drop(batch_rx);
        drop(hit_tx);

        let mut read_error = None;
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        for line in candidates {
            if found.load(Ordering::Acquire) {
                break;
            }
            if options.should_stop() {
                interrupted.store(true, Ordering::Release);
                break;
            }
            let line = match line {
                Ok(line) => Zeroizing::new(line),
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            };
            if let Some(secret) = candidate(&line) {
                batch.push(Zeroizing::new(secret.to_string()));
            }
            // A closed channel means every worker already stopped.
            if batch.len() == BATCH_SIZE && batch_tx.send(mem::take(&mut batch)).is_err() {
                break;
            }
        }
        if !batch.is_empty() && read_error.is_none() && !found.load(Ordering::Acquire) {
            let _ = batch_tx.send(batch);
        }
        drop(batch_tx);

        (hit_rx.recv().ok(), read_error)
    });

    let attempts = attempts.load(Ordering::Relaxed);
    match (hit, read_error) {
        (Some(secret), _) => Search::Hit { secret, attempts },
        (None, Some(source)) => Search::ReadFailed { source },
        (None, None) if interrupted.load(Ordering::Acquire) => Search::Interrupted { attempts },
        (None, None) => Search::Exhausted { attempts },
    }
}
