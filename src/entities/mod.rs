//! sea-orm entities, one module per table.

pub mod customer;
pub mod customization_comment;
pub mod customization_request;
pub mod fulfillment_task;
pub mod inventory_transaction;
pub mod invoice;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod payment_term;
pub mod product;
pub mod profile;
pub mod shipment;
pub mod shipment_item;
pub mod shipping_carrier;
pub mod workflow_step;
