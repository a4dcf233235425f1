/*!
 * # Role-Based Access Control
 *
 * One declarative table maps each role to the page sections it may open and
 * the actions it may perform. Page guards, navigation and action buttons all
 * read from it; nothing else decides access.
 */

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

/// Role tag carried on a profile
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Sales,
    Ops,
    Finance,
    Client,
}

/// Page section keys
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    Dashboard,
    Orders,
    Customers,
    Products,
    Inventory,
    Fulfillment,
    Shipping,
    Billing,
    Invoices,
    Payments,
    Customizations,
    Analytics,
    Support,
}

/// Actions that render as buttons and gate writes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    CreateOrder,
    EditOrder,
    PlaceOrder,
    UpdateOrderStatus,
    ManageCustomers,
    ManageProducts,
    AdjustInventory,
    ManageShipments,
    ManageFulfillment,
    CreateInvoice,
    UpdateInvoiceStatus,
    RecordPayment,
    RequestCustomization,
    EditCustomization,
    CommentCustomization,
    UpdateWorkflowStep,
}

/// Sections and actions granted to one role
#[derive(Debug, Clone)]
pub struct RoleGrant {
    pub description: &'static str,
    pub sections: HashSet<Section>,
    pub capabilities: HashSet<Capability>,
}

const SHARED_SECTIONS: [Section; 7] = [
    Section::Dashboard,
    Section::Orders,
    Section::Products,
    Section::Shipping,
    Section::Invoices,
    Section::Customizations,
    Section::Support,
];

const SHARED_CAPABILITIES: [Capability; 2] = [
    Capability::CommentCustomization,
    Capability::UpdateWorkflowStep,
];

fn grant(
    description: &'static str,
    sections: &[Section],
    capabilities: &[Capability],
) -> RoleGrant {
    RoleGrant {
        description,
        sections: SHARED_SECTIONS.iter().chain(sections).copied().collect(),
        capabilities: SHARED_CAPABILITIES.iter().chain(capabilities).copied().collect(),
    }
}

lazy_static! {
    pub static ref ROLE_GRANTS: HashMap<Role, RoleGrant> = {
        use Capability::*;
        use Section::*;

        let mut grants = HashMap::new();

        grants.insert(
            Role::Admin,
            grant(
                "Administrator with access to every section",
                &[Customers, Inventory, Fulfillment, Billing, Payments, Analytics],
                &[
                    CreateOrder,
                    EditOrder,
                    UpdateOrderStatus,
                    ManageCustomers,
                    ManageProducts,
                    AdjustInventory,
                    ManageShipments,
                    ManageFulfillment,
                    CreateInvoice,
                    UpdateInvoiceStatus,
                    RecordPayment,
                    RequestCustomization,
                    EditCustomization,
                ],
            ),
        );

        grants.insert(
            Role::Sales,
            grant(
                "Sales staff managing customers and orders",
                &[Customers, Billing, Payments],
                &[
                    CreateOrder,
                    EditOrder,
                    UpdateOrderStatus,
                    ManageCustomers,
                    RequestCustomization,
                ],
            ),
        );

        grants.insert(
            Role::Ops,
            grant(
                "Operations staff running products, stock and shipping",
                &[Inventory, Fulfillment, Billing, Payments, Analytics],
                &[
                    UpdateOrderStatus,
                    ManageProducts,
                    AdjustInventory,
                    ManageShipments,
                    ManageFulfillment,
                    EditCustomization,
                ],
            ),
        );

        grants.insert(
            Role::Finance,
            grant(
                "Finance staff handling invoices and payments",
                &[Inventory, Billing, Payments, Analytics],
                &[CreateInvoice, UpdateInvoiceStatus, RecordPayment],
            ),
        );

        grants.insert(
            Role::Client,
            grant(
                "Customer using the self-service portal",
                &[],
                &[PlaceOrder, RequestCustomization],
            ),
        );

        grants
    };
}

impl Role {
    pub fn grant(self) -> Option<&'static RoleGrant> {
        ROLE_GRANTS.get(&self)
    }

    pub fn can_view(self, section: Section) -> bool {
        self.grant()
            .map(|g| g.sections.contains(&section))
            .unwrap_or(false)
    }

    pub fn can(self, capability: Capability) -> bool {
        self.grant()
            .map(|g| g.capabilities.contains(&capability))
            .unwrap_or(false)
    }

    /// The subset of `wanted` this role holds, in the given order.
    pub fn actions(self, wanted: &[Capability]) -> Vec<Capability> {
        wanted.iter().copied().filter(|c| self.can(*c)).collect()
    }

    pub fn is_staff(self) -> bool {
        self != Role::Client
    }

    /// Roles allowed into a section, used in logs and docs
    pub fn allowed_for(section: Section) -> Vec<Role> {
        Role::iter().filter(|r| r.can_view(section)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn every_role_has_a_grant() {
        for role in Role::iter() {
            assert!(role.grant().is_some(), "{role} missing from table");
            assert!(role.can_view(Section::Dashboard));
        }
    }

    #[rstest]
    #[case(Section::Inventory, &[Role::Admin, Role::Ops, Role::Finance])]
    #[case(Section::Analytics, &[Role::Admin, Role::Ops, Role::Finance])]
    #[case(Section::Fulfillment, &[Role::Admin, Role::Ops])]
    #[case(Section::Customers, &[Role::Admin, Role::Sales])]
    #[case(Section::Billing, &[Role::Admin, Role::Sales, Role::Ops, Role::Finance])]
    fn restricted_sections(#[case] section: Section, #[case] expected: &[Role]) {
        assert_eq!(Role::allowed_for(section), expected.to_vec());
    }

    #[test]
    fn client_cannot_reach_back_office_sections() {
        for section in [
            Section::Inventory,
            Section::Analytics,
            Section::Fulfillment,
            Section::Customers,
            Section::Billing,
            Section::Payments,
        ] {
            assert!(!Role::Client.can_view(section), "client sees {section}");
        }
    }

    #[rstest]
    #[case(Capability::CreateOrder, &[Role::Admin, Role::Sales])]
    #[case(Capability::ManageProducts, &[Role::Admin, Role::Ops])]
    #[case(Capability::ManageShipments, &[Role::Admin, Role::Ops])]
    #[case(Capability::CreateInvoice, &[Role::Admin, Role::Finance])]
    #[case(Capability::RecordPayment, &[Role::Admin, Role::Finance])]
    #[case(Capability::EditCustomization, &[Role::Admin, Role::Ops])]
    #[case(Capability::PlaceOrder, &[Role::Client])]
    fn capability_holders(#[case] capability: Capability, #[case] expected: &[Role]) {
        let holders: Vec<Role> = Role::iter().filter(|r| r.can(capability)).collect();
        assert_eq!(holders, expected.to_vec());
    }

    #[test]
    fn actions_preserve_requested_order() {
        let wanted = [Capability::RecordPayment, Capability::CreateInvoice];
        assert_eq!(Role::Finance.actions(&wanted), wanted.to_vec());
        assert!(Role::Sales.actions(&wanted).is_empty());
    }
}
