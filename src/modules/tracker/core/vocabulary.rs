// Fixed vocabularies of the tracker: task status, project status and priority.
//
// Purpose
// - Give every wire value a typed variant and a fixed display label.
//
// Invariants
// - Labels are total: a value outside the vocabulary is kept verbatim (`Other`) and its label
//   is the raw value itself. Decoding never fails on an unknown label.
// - Task status order is the lifecycle order: starting < in_progress < ongoing < done.
//   Transitions are not restricted; any status may be set from any other.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($wire:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(raw) => raw.as_str(),
                }
            }

            pub fn label(&self) -> &str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Other(raw) => raw.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Other(_))
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $($wire => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match $name::from(raw.as_str()) {
                    $name::Other(_) => $name::Other(raw),
                    known => known,
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Task lifecycle state.
    TaskStatus {
        Starting => ("starting", "🚀 Starting"),
        InProgress => ("in_progress", "⚡ In Progress"),
        Ongoing => ("ongoing", "🔄 Ongoing"),
        Done => ("done", "✅ Done"),
    }
}

vocabulary! {
    ProjectStatus {
        Active => ("active", "🚀 Active"),
        OnHold => ("on_hold", "⏸️ On Hold"),
        Completed => ("completed", "✅ Completed"),
    }
}

vocabulary! {
    Priority {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
    }
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Starting
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Active
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// Upper-case badge text shown next to a task.
    pub fn badge(&self) -> String {
        self.as_str().to_uppercase()
    }
}

/// Display label for a task status wire value. Unknown values are returned unchanged.
pub fn format_status(status: &str) -> String {
    TaskStatus::from(status).label().to_string()
}

/// Display label for a project status wire value. Unknown values are returned unchanged.
pub fn format_project_status(status: &str) -> String {
    ProjectStatus::from(status).label().to_string()
}
