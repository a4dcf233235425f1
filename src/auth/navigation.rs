//! Navigation shells derived from the access table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::rbac::{Role, Section};
use crate::API_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Shell {
    BackOffice,
    Portal,
}

impl Shell {
    pub fn for_role(role: Role) -> Self {
        if role.is_staff() {
            Shell::BackOffice
        } else {
            Shell::Portal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub label: String,
    pub href: String,
    pub section: Section,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Navigation {
    pub shell: Shell,
    pub role: Role,
    pub entries: Vec<NavEntry>,
}

fn entry(group: Option<&str>, label: &str, path: &str, section: Section) -> NavEntry {
    NavEntry {
        group: group.map(str::to_string),
        label: label.to_string(),
        href: format!("{API_PREFIX}{path}"),
        section,
    }
}

const BACK_OFFICE: [(&str, &str, Section); 12] = [
    ("Dashboard", "/dashboard", Section::Dashboard),
    ("Orders", "/orders", Section::Orders),
    ("Customers", "/customers", Section::Customers),
    ("Products", "/products", Section::Products),
    ("Inventory", "/inventory", Section::Inventory),
    ("Fulfillment", "/fulfillment", Section::Fulfillment),
    ("Shipping", "/shipping", Section::Shipping),
    ("Billing", "/billing", Section::Billing),
    ("Invoices", "/invoices", Section::Invoices),
    ("Payments", "/payments", Section::Payments),
    ("Customizations", "/customizations", Section::Customizations),
    ("Analytics", "/analytics", Section::Analytics),
];

/// Navigation entries visible to `role`.
pub fn navigation_for(role: Role) -> Navigation {
    let shell = Shell::for_role(role);
    let entries = match shell {
        Shell::BackOffice => BACK_OFFICE
            .iter()
            .filter(|(_, _, section)| role.can_view(*section))
            // The catalogue is readable by everyone but only listed for its maintainers.
            .filter(|(_, _, section)| {
                *section != Section::Products || matches!(role, Role::Admin | Role::Ops)
            })
            .map(|(label, path, section)| entry(None, label, path, *section))
            .collect(),
        Shell::Portal => vec![
            entry(Some("Main"), "Dashboard", "/dashboard", Section::Dashboard),
            entry(Some("Orders"), "Place Order", "/portal/orders/new", Section::Orders),
            entry(Some("Orders"), "My Orders", "/orders", Section::Orders),
            entry(Some("Orders"), "Track Shipments", "/shipping", Section::Shipping),
            entry(
                Some("Customization"),
                "Personalize Orders",
                "/customizations",
                Section::Customizations,
            ),
            entry(Some("Billing"), "Invoices", "/invoices", Section::Invoices),
            entry(Some("Support"), "Support", "/support", Section::Support),
        ],
    };

    Navigation {
        shell,
        role,
        entries,
    }
}

/// Avatar initials: first letters of up to two name words, else the
/// first two characters of the email, else "U".
pub fn initials(full_name: Option<&str>, email: Option<&str>) -> String {
    if let Some(name) = full_name.filter(|n| !n.trim().is_empty()) {
        return name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase();
    }
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        return email.chars().take(2).collect::<String>().to_uppercase();
    }
    "U".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_gets_portal_shell() {
        let nav = navigation_for(Role::Client);
        assert_eq!(nav.shell, Shell::Portal);
        let labels: Vec<&str> = nav.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Dashboard",
                "Place Order",
                "My Orders",
                "Track Shipments",
                "Personalize Orders",
                "Invoices",
                "Support"
            ]
        );
    }

    #[test]
    fn back_office_entries_follow_the_table() {
        for role in [Role::Admin, Role::Sales, Role::Ops, Role::Finance] {
            let nav = navigation_for(role);
            assert_eq!(nav.shell, Shell::BackOffice);
            assert!(nav.entries.iter().all(|e| role.can_view(e.section)));
        }
        let sales = navigation_for(Role::Sales);
        assert!(sales.entries.iter().any(|e| e.section == Section::Customers));
        assert!(!sales.entries.iter().any(|e| e.section == Section::Inventory));
        assert!(!sales.entries.iter().any(|e| e.section == Section::Products));
    }

    #[test]
    fn admin_sees_everything_but_support() {
        let nav = navigation_for(Role::Admin);
        assert_eq!(nav.entries.len(), 12);
        assert!(nav.entries[0].href.ends_with("/dashboard"));
    }

    #[test]
    fn initials_fallbacks() {
        assert_eq!(initials(Some("ada lovelace byron"), None), "AL");
        assert_eq!(initials(Some("  "), Some("zoe@example.com")), "ZO");
        assert_eq!(initials(None, None), "U");
    }
}
