//! Matching forward windows to their backward counterparts by label.
//!
//! Pairing is exact-match only: a forward window joins the backward window with the
//! identical canonical label. Windows without a counterpart are reported as
//! [`FepBarError::UnpairedWindow`] diagnostics rather than silently dropped, and a
//! duplicate label within one direction aborts pairing outright, since the join
//! would be ambiguous.

use crate::error::FepBarError;
use crate::types::{Direction, Window, WindowPair};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// The result of pairing two window collections.
#[derive(Debug)]
pub struct PairingOutcome {
    /// Matched pairs, ordered by pathway position.
    pub pairs: Vec<WindowPair>,
    /// Per-window problems: unpaired windows and pairwise invariant violations
    /// (direction or temperature mismatches on a matched label). Collected, never
    /// fatal to the remaining windows.
    pub diagnostics: Vec<FepBarError>,
}

/// Pairs a collection of forward windows with a collection of backward windows.
///
/// Each collection is keyed by label; labels present in both yield a validated
/// [`WindowPair`], labels present in only one yield an `UnpairedWindow`
/// diagnostic. A pairwise invariant violation (a mislabelled direction, or a
/// temperature mismatch between the two members) is likewise collected as a
/// diagnostic for that label only.
///
/// # Errors
///
/// [`FepBarError::AmbiguousLabel`] if any label occurs twice within one
/// direction. This is a construction error for the whole collection: no
/// unambiguous pairing exists.
pub fn pair_windows(
    forward: Vec<Window>,
    backward: Vec<Window>,
) -> Result<PairingOutcome, FepBarError> {
    let mut seen_forward = BTreeSet::new();
    for window in &forward {
        if !seen_forward.insert(window.label().to_string()) {
            return Err(FepBarError::AmbiguousLabel {
                label: window.label().to_string(),
                direction: Direction::Forward,
            });
        }
    }

    let mut backward_by_label: BTreeMap<String, Window> = BTreeMap::new();
    for window in backward {
        let label = window.label().to_string();
        if backward_by_label.insert(label.clone(), window).is_some() {
            return Err(FepBarError::AmbiguousLabel {
                label,
                direction: Direction::Backward,
            });
        }
    }

    let mut pairs = Vec::new();
    let mut diagnostics = Vec::new();

    for window in forward {
        match backward_by_label.remove(window.label()) {
            Some(counterpart) => match WindowPair::new(window, counterpart) {
                Ok(pair) => pairs.push(pair),
                Err(violation) => diagnostics.push(violation),
            },
            None => diagnostics.push(FepBarError::UnpairedWindow {
                label: window.label().to_string(),
                direction: window.direction(),
            }),
        }
    }

    for (label, window) in backward_by_label {
        diagnostics.push(FepBarError::UnpairedWindow {
            label,
            direction: window.direction(),
        });
    }

    pairs.sort_by(|a, b| a.pathway_position().total_cmp(&b.pathway_position()));

    Ok(PairingOutcome { pairs, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(l1: f64, l2: f64) -> Window {
        Window::new(l1, l2, vec![1.0]).unwrap().with_temperature(300.0)
    }

    fn backward(l1: f64, l2: f64) -> Window {
        Window::new(l2, l1, vec![-1.0]).unwrap().with_temperature(300.0)
    }

    #[test]
    fn test_matching_labels_pair_in_pathway_order() {
        let fwd = vec![forward(0.04, 0.06), forward(0.02, 0.04), forward(0.00, 0.02)];
        let bwd = vec![backward(0.00, 0.02), backward(0.02, 0.04), backward(0.04, 0.06)];
        let outcome = pair_windows(fwd, bwd).unwrap();
        assert!(outcome.diagnostics.is_empty());
        let labels: Vec<&str> = outcome.pairs.iter().map(|p| p.label()).collect();
        assert_eq!(labels, ["0.00-0.02", "0.02-0.04", "0.04-0.06"]);
    }

    #[test]
    fn test_unpaired_windows_are_reported() {
        let fwd = vec![forward(0.00, 0.02), forward(0.02, 0.04)];
        let bwd = vec![backward(0.00, 0.02), backward(0.04, 0.06)];
        let outcome = pair_windows(fwd, bwd).unwrap();
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 2);
        assert!(outcome.diagnostics.iter().all(|d| matches!(
            d,
            FepBarError::UnpairedWindow { .. }
        )));
    }

    #[test]
    fn test_duplicate_forward_label_is_ambiguous() {
        let fwd = vec![forward(0.00, 0.02), forward(0.00, 0.02)];
        let err = pair_windows(fwd, vec![backward(0.00, 0.02)]).unwrap_err();
        assert!(matches!(
            err,
            FepBarError::AmbiguousLabel {
                direction: Direction::Forward,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_backward_label_is_ambiguous() {
        let bwd = vec![backward(0.00, 0.02), backward(0.00, 0.02)];
        let err = pair_windows(vec![forward(0.00, 0.02)], bwd).unwrap_err();
        assert!(matches!(
            err,
            FepBarError::AmbiguousLabel {
                direction: Direction::Backward,
                ..
            }
        ));
    }

    #[test]
    fn test_temperature_mismatch_is_a_diagnostic_not_fatal() {
        let fwd = vec![
            forward(0.00, 0.02),
            Window::new(0.02, 0.04, vec![1.0]).unwrap().with_temperature(310.0),
        ];
        let bwd = vec![backward(0.00, 0.02), backward(0.02, 0.04)];
        let outcome = pair_windows(fwd, bwd).unwrap();
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].label(), "0.00-0.02");
        assert!(matches!(
            outcome.diagnostics[0],
            FepBarError::TemperatureMismatch { .. }
        ));
    }

    #[test]
    fn test_misdirected_window_is_a_diagnostic() {
        // Two forward windows under the same label: the one passed as "backward"
        // fails the direction invariant for that label only.
        let fwd = vec![forward(0.00, 0.02)];
        let bwd = vec![forward(0.00, 0.02)];
        let outcome = pair_windows(fwd, bwd).unwrap();
        assert!(outcome.pairs.is_empty());
        assert!(matches!(
            outcome.diagnostics[0],
            FepBarError::DirectionMismatch { .. }
        ));
    }
}
