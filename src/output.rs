//! Human-readable rendering for the CLI.

use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::resource::{AclChanges, AclState, AttributeSchema};

#[derive(Tabled)]
struct AclRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    acl_type: String,
    #[tabled(rename = "Rules")]
    rules: String,
}

impl From<&AclState> for AclRow {
    fn from(state: &AclState) -> Self {
        Self {
            id: state.id.clone(),
            name: state.name.clone(),
            acl_type: state.acl_type.to_string(),
            rules: summarize_rules(&state.rules),
        }
    }
}

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Attribute")]
    name: &'static str,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Optional")]
    optional: bool,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Allowed")]
    allowed: String,
}

fn summarize_rules(rules: &str) -> String {
    match rules.lines().count() {
        0 => "-".to_string(),
        1 => rules.trim().to_string(),
        n => format!("{} lines", n),
    }
}

pub fn acl_table(states: &[AclState]) -> String {
    let rows: Vec<AclRow> = states.iter().map(AclRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn schema_table(attributes: &[AttributeSchema]) -> String {
    let rows = attributes.iter().map(|a| AttributeRow {
        name: a.name,
        kind: a.kind,
        optional: a.optional,
        default: a.default.unwrap_or("-").to_string(),
        allowed: if a.allowed.is_empty() {
            "-".to_string()
        } else {
            a.allowed.join(", ")
        },
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn change_tree(root: &str, changes: &AclChanges) -> String {
    let mut tree = Tree::new(root.to_string());

    if changes.is_empty() {
        tree.push(Tree::new("no changes".to_string()));
    } else {
        for change in changes.iter() {
            tree.push(Tree::new(change.to_string()));
        }
    }

    tree.to_string()
}
