//! Rewrites a navigation request so the preferred mode opens first

use tracing::{debug, info};

use super::request::NavigationRequest;
use crate::mode::CanonicalMode;

/// Directive keys through which a request can force its initial mode
pub const FORCED_MODE_DIRECTIVES: &[&str] = &[
    "view_type",
    "force_view_type",
    "initial_view",
    "default_view_type",
];

/// The single directive left behind after an override
pub const PRIMARY_MODE_DIRECTIVE: &str = "force_view_type";

/// Applies a resolved preference to a navigation request.
///
/// Pure and idempotent. When the preferred mode is not the form mode, an
/// available form descriptor is kept right behind it so drilling into a
/// record needs no further resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrider;

impl Overrider {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        mut request: NavigationRequest,
        preferred: Option<&CanonicalMode>,
    ) -> NavigationRequest {
        let Some(mode) = preferred else {
            return request;
        };
        let Some(index) = request
            .available_modes
            .iter()
            .position(|d| &d.canonical_id == mode && d.is_primary_capable)
        else {
            debug!(
                "Preferred mode '{}' is not offered by {}, leaving request unchanged",
                mode, request.model
            );
            return request;
        };

        let original_order = request.view_mode();
        let chosen = request.available_modes.remove(index);
        if !mode.is_form() {
            if let Some(form_index) = request
                .available_modes
                .iter()
                .position(|d| d.canonical_id.is_form())
            {
                let form = request.available_modes.remove(form_index);
                request.available_modes.insert(0, form);
            }
        }
        request.available_modes.insert(0, chosen);

        request.primary_mode = Some(mode.clone());
        for key in FORCED_MODE_DIRECTIVES {
            request.directives.remove(*key);
        }
        request
            .directives
            .insert(PRIMARY_MODE_DIRECTIVE.to_string(), mode.to_string());

        let new_order = request.view_mode();
        if new_order != original_order {
            info!(
                "Reordered modes for {}: {} -> {}",
                request.model, original_order, new_order
            );
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{ModeNormalizer, normalize};
    use crate::navigation::ModeDescriptor;

    fn request(modes: &[&str]) -> NavigationRequest {
        NavigationRequest::new("crm.lead", Some("42"))
            .with_modes(modes.iter().copied(), &ModeNormalizer::default())
    }

    fn order(request: &NavigationRequest) -> Vec<&str> {
        request
            .available_modes
            .iter()
            .map(|d| d.canonical_id.as_str())
            .collect()
    }

    #[test]
    fn test_none_is_noop() {
        let req = request(&["kanban", "list", "form"]).with_directive("view_type", "kanban");
        assert_eq!(Overrider::new().apply(req.clone(), None), req);
    }

    #[test]
    fn test_absent_mode_is_noop() {
        let req = request(&["kanban", "list", "form"]);
        assert_eq!(Overrider::new().apply(req.clone(), Some(&normalize("pivot"))), req);
    }

    #[test]
    fn test_preferred_first_form_second() {
        let req = request(&["kanban", "form", "calendar", "list"]);
        let out = Overrider::new().apply(req, Some(&normalize("list")));

        assert_eq!(order(&out), vec!["list", "form", "kanban", "calendar"]);
        assert_eq!(out.primary_mode, Some(normalize("list")));
        assert_eq!(out.view_mode(), "list,form,kanban,calendar");
    }

    #[test]
    fn test_alias_descriptor_matches_canonical_preference() {
        let req = request(&["kanban", "tree", "form"]);
        let out = Overrider::new().apply(req, Some(&normalize("list")));

        assert_eq!(out.available_modes[0].id, "tree");
        assert_eq!(out.available_modes[1].id, "form");
    }

    #[test]
    fn test_form_preferred_moves_to_front() {
        let already_first = request(&["form", "list"]);
        let out = Overrider::new().apply(already_first, Some(&normalize("form")));
        assert_eq!(order(&out), vec!["form", "list"]);

        let later = request(&["list", "kanban", "form"]);
        let out = Overrider::new().apply(later, Some(&normalize("form")));
        assert_eq!(order(&out), vec!["form", "list", "kanban"]);
    }

    #[test]
    fn test_without_form_descriptor() {
        let req = request(&["kanban", "list", "pivot"]);
        let out = Overrider::new().apply(req, Some(&normalize("pivot")));
        assert_eq!(order(&out), vec!["pivot", "kanban", "list"]);
    }

    #[test]
    fn test_directives_collapse_to_one() {
        let req = request(&["kanban", "list", "form"])
            .with_directive("view_type", "kanban")
            .with_directive("default_view_type", "kanban")
            .with_directive("initial_view", "form")
            .with_directive("group_by", "stage_id");
        assert!(req.has_conflicting_directives());

        let out = Overrider::new().apply(req, Some(&normalize("list")));
        assert!(!out.has_conflicting_directives());
        assert_eq!(out.forced_modes(), vec!["list"]);
        assert_eq!(
            out.directives.get(PRIMARY_MODE_DIRECTIVE).map(String::as_str),
            Some("list")
        );
        assert_eq!(out.directives.get("group_by").map(String::as_str), Some("stage_id"));
        assert_eq!(out.directives.len(), 2);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let overrider = Overrider::new();
        for preferred in ["list", "kanban", "form", "calendar", "graph"] {
            let mode = normalize(preferred);
            let req = request(&["kanban", "form", "calendar", "tree"])
                .with_directive("view_type", "kanban");
            let once = overrider.apply(req, Some(&mode));
            let twice = overrider.apply(once.clone(), Some(&mode));
            assert_eq!(once, twice, "not idempotent for {}", preferred);
        }
    }

    #[test]
    fn test_secondary_mode_is_not_promoted() {
        let normalizer = ModeNormalizer::default();
        let req = NavigationRequest::new("crm.lead", Some("42"))
            .with_mode(ModeDescriptor::new("list", &normalizer))
            .with_mode(ModeDescriptor::secondary("search", &normalizer));
        assert_eq!(
            Overrider::new().apply(req.clone(), Some(&normalize("search"))),
            req
        );
    }

    #[test]
    fn test_view_ids_travel_with_descriptors() {
        let normalizer = ModeNormalizer::default();
        let req = NavigationRequest::new("crm.lead", Some("42"))
            .with_mode(ModeDescriptor::new("kanban", &normalizer).with_view_id(11))
            .with_mode(ModeDescriptor::new("list", &normalizer).with_view_id(12));
        let out = Overrider::new().apply(req, Some(&normalize("list")));
        assert_eq!(out.available_modes[0].view_id, Some(12));
        assert_eq!(out.available_modes[1].view_id, Some(11));
    }
}
