//! Dump scope selectors and dump filenames.

use crate::registry::ModelMeta;
use crate::types::Timestamp;

/// Timestamp layout embedded in dump filenames.
pub const DUMP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Which records a dump covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSelector {
    All,
    App(String),
    Model { app_label: String, model: String },
}

impl ScopeSelector {
    /// Parse a single label: `"app"` or `"app.model"`.
    ///
    /// Returns `None` for a blank label.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(match label.split_once('.') {
            Some((app_label, model)) => Self::Model {
                app_label: app_label.to_string(),
                model: model.to_string(),
            },
            None => Self::App(label.to_string()),
        })
    }

    /// Parse a comma-separated label list such as `"auth.user,sites"`.
    pub fn parse_list(labels: &str) -> Vec<Self> {
        labels.split(',').filter_map(Self::parse).collect()
    }

    /// Whether this selector names the given model.
    pub fn covers(&self, model: &ModelMeta) -> bool {
        match self {
            Self::All => true,
            Self::App(label) => model.app_label == *label,
            Self::Model { app_label, model: name } => {
                model.app_label == *app_label && model.name.eq_ignore_ascii_case(name)
            }
        }
    }

    /// Filename prefix for a dump of this scope, including the trailing `_`.
    pub fn filename_prefix(&self) -> String {
        match self {
            Self::All => String::new(),
            Self::App(label) => format!("{label}_"),
            Self::Model { app_label, model } => format!("{app_label}-{model}_"),
        }
    }

    /// Application whose admin page a failed dump of this scope returns to.
    pub fn app_label(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::App(label) => Some(label),
            Self::Model { app_label, .. } => Some(app_label),
        }
    }
}

/// Build the attachment filename for a dump taken at `now`.
pub fn dump_filename(scope: &ScopeSelector, now: Timestamp) -> String {
    format!(
        "{}{}.json",
        scope.filename_prefix(),
        now.format(DUMP_TIMESTAMP_FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn frozen() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2012, 1, 14, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_app_and_model_labels() {
        assert_eq!(ScopeSelector::parse("sites"), Some(ScopeSelector::App("sites".into())));
        assert_eq!(
            ScopeSelector::parse(" auth.user "),
            Some(ScopeSelector::Model {
                app_label: "auth".into(),
                model: "user".into()
            })
        );
        assert_eq!(ScopeSelector::parse("  "), None);
    }

    #[test]
    fn parse_list_skips_blank_entries() {
        let list = ScopeSelector::parse_list("auth.user,,sites,");
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], ScopeSelector::App("sites".into()));
    }

    #[test]
    fn filenames_carry_scope_prefix() {
        assert_eq!(
            dump_filename(&ScopeSelector::All, frozen()),
            "2012-01-14T00:00:00.json"
        );
        assert_eq!(
            dump_filename(&ScopeSelector::App("sites".into()), frozen()),
            "sites_2012-01-14T00:00:00.json"
        );
        assert_eq!(
            dump_filename(
                &ScopeSelector::Model {
                    app_label: "sites".into(),
                    model: "site".into()
                },
                frozen()
            ),
            "sites-site_2012-01-14T00:00:00.json"
        );
    }
}
