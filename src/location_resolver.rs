//! Location Resolution Module
//!
//! [`ResolutionController`] turns raw place text into a single place or a
//! short list to choose from:
//!
//! ```text
//! Idle -> Searching -> Resolved        (exactly one candidate)
//!                   -> AwaitingChoice  (2-5 candidates) -> Resolved on select()
//!                   -> NotFound        (nothing matched)
//!                   -> Failed          (rejected input, geocoder unreachable)
//! ```
//!
//! Every `resolve` call bumps a generation counter. A search that completes
//! after a newer `resolve` has started is dropped and never touches the
//! observable state.

use crate::geocoding::{GeocodeClient, GeocodeSource};
use crate::models::PlaceCandidate;
use crate::ranking::CandidateRanker;
use crate::variants::VariantGenerator;
use crate::{AgriWeatherError, Result};
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

/// Result of one resolution request
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// Exactly one match, accepted without asking
    Resolved(PlaceCandidate),
    /// Several matches ranked by population; the caller must `select` one
    AmbiguousChoice(Vec<PlaceCandidate>),
    /// Nothing matched, fallback included
    NotFound,
    /// The input was rejected, or every geocoding request failed
    Failed(AgriWeatherError),
}

/// Observable controller state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResolutionState {
    #[default]
    Idle,
    Searching,
    Resolved(PlaceCandidate),
    AwaitingChoice(Vec<PlaceCandidate>),
    NotFound,
    Failed(String),
}

impl From<&ResolutionOutcome> for ResolutionState {
    fn from(outcome: &ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::Resolved(place) => ResolutionState::Resolved(place.clone()),
            ResolutionOutcome::AmbiguousChoice(places) => {
                ResolutionState::AwaitingChoice(places.clone())
            }
            ResolutionOutcome::NotFound => ResolutionState::NotFound,
            ResolutionOutcome::Failed(e) => ResolutionState::Failed(e.to_string()),
        }
    }
}

struct ControllerInner {
    generation: u64,
    state: ResolutionState,
}

/// Drives variant generation, geocoding and ranking for one search box
pub struct ResolutionController<G> {
    geocoder: GeocodeClient<G>,
    inner: Mutex<ControllerInner>,
}

impl<G: GeocodeSource> ResolutionController<G> {
    pub fn new(geocoder: GeocodeClient<G>) -> Self {
        Self {
            geocoder,
            inner: Mutex::new(ControllerInner {
                generation: 0,
                state: ResolutionState::Idle,
            }),
        }
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> ResolutionState {
        self.inner.lock().state.clone()
    }

    /// Resolve raw place text.
    ///
    /// Returns `None` when a newer `resolve` call started before this one
    /// finished; the stale result is discarded.
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw_input: &str) -> Option<ResolutionOutcome> {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            // a pending choice from an earlier search is no longer valid
            inner.state = ResolutionState::Searching;
            inner.generation
        };

        let outcome = self.search(raw_input).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(
                "Discarding stale resolution of '{}' (generation {} < {})",
                raw_input, generation, inner.generation
            );
            return None;
        }
        inner.state = ResolutionState::from(&outcome);
        Some(outcome)
    }

    /// Accept one of the offered candidates.
    ///
    /// Only valid while awaiting a choice, and only for a candidate from the
    /// offered list; anything else is a [`AgriWeatherError::SelectionViolation`].
    pub fn select(&self, candidate: &PlaceCandidate) -> Result<PlaceCandidate> {
        let mut inner = self.inner.lock();
        match &inner.state {
            ResolutionState::AwaitingChoice(offered) if offered.contains(candidate) => {
                info!("Selected '{}'", candidate.label);
                inner.state = ResolutionState::Resolved(candidate.clone());
                Ok(candidate.clone())
            }
            ResolutionState::AwaitingChoice(_) => Err(AgriWeatherError::selection_violation(
                format!("'{}' was not among the offered matches", candidate.label),
            )),
            other => Err(AgriWeatherError::selection_violation(format!(
                "no choice is pending (state: {other:?})"
            ))),
        }
    }

    async fn search(&self, raw_input: &str) -> ResolutionOutcome {
        let plan = match VariantGenerator::generate(raw_input) {
            Ok(plan) => plan,
            Err(e) => return ResolutionOutcome::Failed(e),
        };

        let candidates = match self.geocoder.resolve_candidates(&plan).await {
            Ok(candidates) => candidates,
            Err(e) => return ResolutionOutcome::Failed(e),
        };
        let mut ranked = CandidateRanker::rank(candidates);

        match ranked.len() {
            0 => ResolutionOutcome::NotFound,
            1 => {
                let place = ranked.remove(0);
                debug!(
                    "Resolved '{}' to {} at ({}, {})",
                    raw_input, place.label, place.latitude, place.longitude
                );
                ResolutionOutcome::Resolved(place)
            }
            _ => ResolutionOutcome::AmbiguousChoice(ranked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryVariant;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Every query text maps to a fixed list of places; "Slowtown" blocks on a gate
    struct StubSource {
        places: HashMap<String, Vec<PlaceCandidate>>,
        gate: Arc<Notify>,
    }

    impl StubSource {
        fn new(entries: &[(&str, &[(&str, u64)])]) -> Self {
            let places = entries
                .iter()
                .map(|(query, found)| {
                    let found = found
                        .iter()
                        .map(|(label, pop)| {
                            PlaceCandidate::new(13.0, 80.0, *pop, (*label).to_string()).unwrap()
                        })
                        .collect();
                    ((*query).to_string(), found)
                })
                .collect();
            Self {
                places,
                gate: Arc::new(Notify::new()),
            }
        }
    }

    #[async_trait]
    impl GeocodeSource for StubSource {
        async fn search(&self, variant: &QueryVariant) -> Result<Vec<PlaceCandidate>> {
            if variant.query_text == "Slowtown" {
                self.gate.notified().await;
            }
            Ok(self
                .places
                .get(&variant.query_text)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn controller(entries: &[(&str, &[(&str, u64)])]) -> ResolutionController<StubSource> {
        ResolutionController::new(GeocodeClient::new(StubSource::new(entries), "IN"))
    }

    #[tokio::test]
    async fn test_single_candidate_resolves_without_selection() {
        let controller = controller(&[("Pune", &[("Pune, Maharashtra, IN", 3_124_458)])]);
        assert_eq!(controller.state(), ResolutionState::Idle);

        let outcome = controller.resolve("Pune").await;

        let Some(ResolutionOutcome::Resolved(place)) = outcome else {
            panic!("expected Resolved, got {outcome:?}");
        };
        assert_eq!(place.label, "Pune, Maharashtra, IN");
        assert_eq!(controller.state(), ResolutionState::Resolved(place));
    }

    #[tokio::test]
    async fn test_multiple_candidates_await_choice() {
        let controller = controller(&[(
            "Springfield",
            &[("Springfield, IL", 114_394), ("Springfield, MA", 155_929), ("Springfield, MO", 169_176)],
        )]);

        let Some(ResolutionOutcome::AmbiguousChoice(choices)) =
            controller.resolve("Springfield").await
        else {
            panic!("expected AmbiguousChoice");
        };
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].label, "Springfield, MO");
        assert!(matches!(controller.state(), ResolutionState::AwaitingChoice(_)));

        let chosen = controller.select(&choices[1]).unwrap();
        assert_eq!(chosen, choices[1]);
        assert_eq!(controller.state(), ResolutionState::Resolved(choices[1].clone()));
    }

    #[tokio::test]
    async fn test_select_with_unknown_candidate_is_violation() {
        let controller = controller(&[("Salem", &[("Salem, Tamil Nadu, IN", 10), ("Salem, OR, US", 5)])]);
        controller.resolve("Salem").await;

        let stranger = PlaceCandidate::new(1.0, 2.0, 0, "Elsewhere".into()).unwrap();
        let err = controller.select(&stranger).unwrap_err();
        assert!(matches!(err, AgriWeatherError::SelectionViolation { .. }));
        assert!(matches!(controller.state(), ResolutionState::AwaitingChoice(_)));
    }

    #[tokio::test]
    async fn test_select_without_pending_choice_is_violation() {
        let controller = controller(&[("Pune", &[("Pune, IN", 1)])]);
        let place = PlaceCandidate::new(13.0, 80.0, 1, "Pune, IN".into()).unwrap();
        assert!(controller.select(&place).is_err());

        controller.resolve("Pune").await;
        // already resolved, nothing to choose
        assert!(controller.select(&place).is_err());
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let controller = controller(&[]);
        let outcome = controller.resolve("Atlantis").await;
        assert!(matches!(outcome, Some(ResolutionOutcome::NotFound)));
        assert_eq!(controller.state(), ResolutionState::NotFound);
    }

    /// Geocoder that never answers
    struct OfflineSource;

    #[async_trait]
    impl GeocodeSource for OfflineSource {
        async fn search(&self, variant: &QueryVariant) -> Result<Vec<PlaceCandidate>> {
            Err(AgriWeatherError::geocode_transport(
                &variant.query_text,
                "connection refused",
            ))
        }
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_fails_instead_of_not_found() {
        let controller = ResolutionController::new(GeocodeClient::new(OfflineSource, "IN"));

        let outcome = controller.resolve("Chennai, IN").await;

        let Some(ResolutionOutcome::Failed(err)) = outcome else {
            panic!("expected Failed, got {outcome:?}");
        };
        assert!(matches!(err, AgriWeatherError::GeocodeTransport { .. }));
        assert!(err.user_message().contains("Unable to connect"));
        assert!(matches!(controller.state(), ResolutionState::Failed(_)));
    }

    #[tokio::test]
    async fn test_blank_input_fails() {
        let controller = controller(&[]);
        let outcome = controller.resolve("   ").await;
        assert!(matches!(
            outcome,
            Some(ResolutionOutcome::Failed(AgriWeatherError::InvalidInput { .. }))
        ));
        assert!(matches!(controller.state(), ResolutionState::Failed(_)));
    }

    #[tokio::test]
    async fn test_more_than_five_candidates_are_trimmed() {
        let many: Vec<(&str, u64)> = vec![
            ("a", 1),
            ("b", 2),
            ("c", 3),
            ("d", 4),
            ("e", 5),
            ("f", 6),
            ("g", 7),
        ];
        let controller = controller(&[("Many", &many)]);

        let Some(ResolutionOutcome::AmbiguousChoice(choices)) = controller.resolve("Many").await
        else {
            panic!("expected AmbiguousChoice");
        };
        assert_eq!(choices.len(), 5);
        assert_eq!(choices[0].label, "g");
    }

    #[tokio::test]
    async fn test_new_search_invalidates_pending_choice() {
        let controller = controller(&[
            ("Salem", &[("Salem, Tamil Nadu, IN", 10), ("Salem, OR, US", 5)]),
            ("Pune", &[("Pune, IN", 1)]),
        ]);
        let Some(ResolutionOutcome::AmbiguousChoice(choices)) = controller.resolve("Salem").await
        else {
            panic!("expected AmbiguousChoice");
        };

        controller.resolve("Pune").await;

        assert!(controller.select(&choices[0]).is_err());
    }

    #[tokio::test]
    async fn test_last_request_wins() {
        let controller = controller(&[
            ("Slowtown", &[("Slowtown, IN", 1)]),
            ("Pune", &[("Pune, IN", 1)]),
        ]);
        let gate = controller.geocoder.source().gate.clone();

        let first = controller.resolve("Slowtown");
        let second = async {
            let outcome = controller.resolve("Pune").await;
            gate.notify_one();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_none());
        assert!(matches!(second, Some(ResolutionOutcome::Resolved(ref p)) if p.label == "Pune, IN"));
        assert!(matches!(controller.state(), ResolutionState::Resolved(p) if p.label == "Pune, IN"));
    }
}
