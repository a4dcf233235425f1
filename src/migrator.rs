use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_customers_and_profiles::Migration),
            Box::new(m20240601_000002_create_catalog_tables::Migration),
            Box::new(m20240601_000003_create_orders_tables::Migration),
            Box::new(m20240601_000004_create_billing_tables::Migration),
            Box::new(m20240601_000005_create_shipping_tables::Migration),
            Box::new(m20240601_000006_create_customization_tables::Migration),
            Box::new(m20240601_000007_create_fulfillment_tasks_table::Migration),
        ]
    }
}

fn query_err(e: sea_query::error::Error) -> DbErr {
    DbErr::Custom(e.to_string())
}

// Migration implementations

mod m20240601_000001_create_customers_and_profiles {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_customers_and_profiles"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::CompanyName).string().not_null())
                        .col(ColumnDef::new(Customers::ContactName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::AddressLine1).string().null())
                        .col(ColumnDef::new(Customers::AddressLine2).string().null())
                        .col(ColumnDef::new(Customers::City).string().null())
                        .col(ColumnDef::new(Customers::State).string().null())
                        .col(ColumnDef::new(Customers::PostalCode).string().null())
                        .col(ColumnDef::new(Customers::Country).string().null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Profiles::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Profiles::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Profiles::FullName).string().null())
                        .col(
                            ColumnDef::new(Profiles::Role)
                                .string()
                                .not_null()
                                .default("client"),
                        )
                        .col(ColumnDef::new(Profiles::CustomerId).uuid().null())
                        .col(ColumnDef::new(Profiles::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Profiles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Profiles::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_profiles_customer_id")
                                .from(Profiles::Table, Profiles::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Customers {
        Table,
        Id,
        CompanyName,
        ContactName,
        Email,
        Phone,
        AddressLine1,
        AddressLine2,
        City,
        State,
        PostalCode,
        Country,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum Profiles {
        Table,
        Id,
        Email,
        FullName,
        Role,
        CustomerId,
        PasswordHash,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000002_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().not_null().unique_key())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(
                            ColumnDef::new(Products::BasePrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinStockLevel)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(
                            ColumnDef::new(Products::IsCustomizable)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::QuantityDelta)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ResultingLevel)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ReferenceType)
                                .string()
                                .not_null()
                                .default("adjustment"),
                        )
                        .col(ColumnDef::new(InventoryTransactions::ReferenceId).uuid().null())
                        .col(ColumnDef::new(InventoryTransactions::Notes).text().null())
                        .col(ColumnDef::new(InventoryTransactions::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_transactions_product_id")
                                .from(InventoryTransactions::Table, InventoryTransactions::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_product_id")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Products {
        Table,
        Id,
        Name,
        Sku,
        Description,
        Category,
        BasePrice,
        StockQuantity,
        MinStockLevel,
        IsCustomizable,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryTransactions {
        Table,
        Id,
        ProductId,
        TransactionType,
        Quantity,
        QuantityDelta,
        ResultingLevel,
        ReferenceType,
        ReferenceId,
        Notes,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240601_000003_create_orders_tables {

    use super::m20240601_000001_create_customers_and_profiles::Customers;
    use super::m20240601_000002_create_catalog_tables::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(Orders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::RequiredDate).date().null())
                        .col(
                            ColumnDef::new(Orders::ShippedDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TaxAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::ShippingAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::DiscountAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Currency)
                                .string()
                                .not_null()
                                .default("USD"),
                        )
                        .col(ColumnDef::new(Orders::ShippingMethod).string().null())
                        .col(ColumnDef::new(Orders::PaymentMethod).string().null())
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(ColumnDef::new(Orders::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::TotalPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Orders {
        Table,
        Id,
        OrderNumber,
        CustomerId,
        Status,
        OrderDate,
        RequiredDate,
        ShippedDate,
        TotalAmount,
        TaxAmount,
        ShippingAmount,
        DiscountAmount,
        Currency,
        ShippingMethod,
        PaymentMethod,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        UnitPrice,
        TotalPrice,
        Status,
        CreatedAt,
    }
}

mod m20240601_000004_create_billing_tables {

    use super::m20240601_000001_create_customers_and_profiles::Customers;
    use super::m20240601_000003_create_orders_tables::Orders;
    use super::query_err;
    use sea_orm_migration::prelude::*;
    use uuid::Uuid;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_billing_tables"
        }
    }

    const DEFAULT_TERMS: [(&str, i32); 5] = [
        ("Due on Receipt", 0),
        ("Net 15", 15),
        ("Net 30", 30),
        ("Net 45", 45),
        ("Net 60", 60),
    ];

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaymentTerms::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentTerms::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentTerms::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PaymentTerms::Days).integer().not_null())
                        .col(
                            ColumnDef::new(PaymentTerms::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            let mut seed = Query::insert();
            seed.into_table(PaymentTerms::Table).columns([
                PaymentTerms::Id,
                PaymentTerms::Name,
                PaymentTerms::Days,
                PaymentTerms::IsActive,
            ]);
            for (name, days) in DEFAULT_TERMS {
                seed.values([
                    Uuid::new_v4().into(),
                    name.into(),
                    days.into(),
                    true.into(),
                ])
                .map_err(query_err)?;
            }
            manager.exec_stmt(seed).await?;

            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Invoices::InvoiceNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Invoices::OrderId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Invoices::Status)
                                .string()
                                .not_null()
                                .default("draft"),
                        )
                        .col(ColumnDef::new(Invoices::Subtotal).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Invoices::TaxAmount).decimal_len(14, 2).not_null())
                        .col(
                            ColumnDef::new(Invoices::ShippingAmount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::DiscountAmount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::TotalAmount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::Currency)
                                .string()
                                .not_null()
                                .default("USD"),
                        )
                        .col(ColumnDef::new(Invoices::PaymentTerms).string().null())
                        .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date().null())
                        .col(ColumnDef::new(Invoices::PaidDate).date().null())
                        .col(ColumnDef::new(Invoices::Notes).text().null())
                        .col(ColumnDef::new(Invoices::TermsConditions).text().null())
                        .col(ColumnDef::new(Invoices::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Invoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_order_id")
                                .from(Invoices::Table, Invoices::OrderId)
                                .to(Orders::Table, Orders::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_customer_id")
                                .from(Invoices::Table, Invoices::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Payments::PaymentMethod).string().not_null())
                        .col(
                            ColumnDef::new(Payments::PaymentStatus)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Payments::TransactionId).string().null())
                        .col(
                            ColumnDef::new(Payments::PaymentDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::Notes).text().null())
                        .col(ColumnDef::new(Payments::RecordedBy).uuid().null())
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payments_invoice_id")
                                .from(Payments::Table, Payments::InvoiceId)
                                .to(Invoices::Table, Invoices::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentTerms::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PaymentTerms {
        Table,
        Id,
        Name,
        Days,
        IsActive,
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        InvoiceNumber,
        OrderId,
        CustomerId,
        Status,
        Subtotal,
        TaxAmount,
        ShippingAmount,
        DiscountAmount,
        TotalAmount,
        Currency,
        PaymentTerms,
        IssueDate,
        DueDate,
        PaidDate,
        Notes,
        TermsConditions,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        InvoiceId,
        Amount,
        PaymentMethod,
        PaymentStatus,
        TransactionId,
        PaymentDate,
        Notes,
        RecordedBy,
        CreatedAt,
    }
}

mod m20240601_000005_create_shipping_tables {

    use super::m20240601_000003_create_orders_tables::{OrderItems, Orders};
    use super::query_err;
    use sea_orm_migration::prelude::*;
    use serde_json::json;
    use uuid::Uuid;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_shipping_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShippingCarriers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShippingCarriers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShippingCarriers::Name).string().not_null())
                        .col(
                            ColumnDef::new(ShippingCarriers::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ShippingCarriers::SupportedServices)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShippingCarriers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            let carriers = [
                ("UPS", "ups", json!(["ground", "2nd_day_air", "next_day_air"])),
                ("FedEx", "fedex", json!(["ground", "express_saver", "priority_overnight"])),
                ("USPS", "usps", json!(["ground_advantage", "priority", "priority_express"])),
                ("DHL", "dhl", json!(["express_worldwide", "economy_select"])),
            ];
            let mut seed = Query::insert();
            seed.into_table(ShippingCarriers::Table).columns([
                ShippingCarriers::Id,
                ShippingCarriers::Name,
                ShippingCarriers::Code,
                ShippingCarriers::SupportedServices,
                ShippingCarriers::IsActive,
            ]);
            for (name, code, services) in carriers {
                seed.values([
                    Uuid::new_v4().into(),
                    name.into(),
                    code.into(),
                    services.into(),
                    true.into(),
                ])
                .map_err(query_err)?;
            }
            manager.exec_stmt(seed).await?;

            manager
                .create_table(
                    Table::create()
                        .table(Shipments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Shipments::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Shipments::ShipmentNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Shipments::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Shipments::CarrierId).uuid().null())
                        .col(ColumnDef::new(Shipments::ServiceType).string().null())
                        .col(ColumnDef::new(Shipments::TrackingNumber).string().null())
                        .col(
                            ColumnDef::new(Shipments::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Shipments::ShipToName).string().null())
                        .col(ColumnDef::new(Shipments::ShipToCompany).string().null())
                        .col(ColumnDef::new(Shipments::ShipToAddressLine1).string().null())
                        .col(ColumnDef::new(Shipments::ShipToAddressLine2).string().null())
                        .col(ColumnDef::new(Shipments::ShipToCity).string().null())
                        .col(ColumnDef::new(Shipments::ShipToState).string().null())
                        .col(ColumnDef::new(Shipments::ShipToPostalCode).string().null())
                        .col(ColumnDef::new(Shipments::ShipToCountry).string().null())
                        .col(ColumnDef::new(Shipments::ShipFromName).string().not_null())
                        .col(ColumnDef::new(Shipments::ShipFromCompany).string().not_null())
                        .col(
                            ColumnDef::new(Shipments::ShipFromAddressLine1)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shipments::ShipFromCity).string().not_null())
                        .col(ColumnDef::new(Shipments::ShipFromState).string().not_null())
                        .col(
                            ColumnDef::new(Shipments::ShipFromPostalCode)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shipments::WeightLbs).decimal_len(10, 2).null())
                        .col(ColumnDef::new(Shipments::LengthIn).decimal_len(10, 2).null())
                        .col(ColumnDef::new(Shipments::WidthIn).decimal_len(10, 2).null())
                        .col(ColumnDef::new(Shipments::HeightIn).decimal_len(10, 2).null())
                        .col(
                            ColumnDef::new(Shipments::DeclaredValue)
                                .decimal_len(14, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Shipments::ShippingCost)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Shipments::EstimatedDeliveryDate).date().null())
                        .col(
                            ColumnDef::new(Shipments::ShippedDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Shipments::DeliveredDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Shipments::SpecialInstructions).text().null())
                        .col(ColumnDef::new(Shipments::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Shipments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Shipments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_order_id")
                                .from(Shipments::Table, Shipments::OrderId)
                                .to(Orders::Table, Orders::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_carrier_id")
                                .from(Shipments::Table, Shipments::CarrierId)
                                .to(ShippingCarriers::Table, ShippingCarriers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ShipmentItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShipmentItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShipmentItems::ShipmentId).uuid().not_null())
                        .col(ColumnDef::new(ShipmentItems::OrderItemId).uuid().not_null())
                        .col(ColumnDef::new(ShipmentItems::Quantity).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipment_items_shipment_id")
                                .from(ShipmentItems::Table, ShipmentItems::ShipmentId)
                                .to(Shipments::Table, Shipments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipment_items_order_item_id")
                                .from(ShipmentItems::Table, ShipmentItems::OrderItemId)
                                .to(OrderItems::Table, OrderItems::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ShipmentItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Shipments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ShippingCarriers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ShippingCarriers {
        Table,
        Id,
        Name,
        Code,
        SupportedServices,
        IsActive,
    }

    #[derive(DeriveIden)]
    enum Shipments {
        Table,
        Id,
        ShipmentNumber,
        OrderId,
        CarrierId,
        ServiceType,
        TrackingNumber,
        Status,
        ShipToName,
        ShipToCompany,
        #[sea_orm(iden = "ship_to_address_line1")]
        ShipToAddressLine1,
        #[sea_orm(iden = "ship_to_address_line2")]
        ShipToAddressLine2,
        ShipToCity,
        ShipToState,
        ShipToPostalCode,
        ShipToCountry,
        ShipFromName,
        ShipFromCompany,
        #[sea_orm(iden = "ship_from_address_line1")]
        ShipFromAddressLine1,
        ShipFromCity,
        ShipFromState,
        ShipFromPostalCode,
        WeightLbs,
        LengthIn,
        WidthIn,
        HeightIn,
        DeclaredValue,
        ShippingCost,
        EstimatedDeliveryDate,
        ShippedDate,
        DeliveredDate,
        SpecialInstructions,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ShipmentItems {
        Table,
        Id,
        ShipmentId,
        OrderItemId,
        Quantity,
    }
}

mod m20240601_000006_create_customization_tables {

    use super::m20240601_000001_create_customers_and_profiles::Profiles;
    use super::m20240601_000003_create_orders_tables::OrderItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_customization_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CustomizationRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomizationRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::OrderItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::RequestedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::RequestType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomizationRequests::Title).string().not_null())
                        .col(
                            ColumnDef::new(CustomizationRequests::Description)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::Specifications)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::Priority)
                                .string()
                                .not_null()
                                .default("medium"),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::EstimatedCost)
                                .decimal_len(12, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::EstimatedDays)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(CustomizationRequests::AssignedTo).uuid().null())
                        .col(ColumnDef::new(CustomizationRequests::ReviewedBy).uuid().null())
                        .col(ColumnDef::new(CustomizationRequests::ReviewNotes).text().null())
                        .col(
                            ColumnDef::new(CustomizationRequests::ApprovedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationRequests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customization_requests_order_item_id")
                                .from(
                                    CustomizationRequests::Table,
                                    CustomizationRequests::OrderItemId,
                                )
                                .to(OrderItems::Table, OrderItems::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customization_requests_requested_by")
                                .from(
                                    CustomizationRequests::Table,
                                    CustomizationRequests::RequestedBy,
                                )
                                .to(Profiles::Table, Profiles::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkflowSteps::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkflowSteps::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowSteps::CustomizationRequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkflowSteps::StepName).string().not_null())
                        .col(ColumnDef::new(WorkflowSteps::StepOrder).integer().not_null())
                        .col(
                            ColumnDef::new(WorkflowSteps::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(WorkflowSteps::AssignedTo).uuid().null())
                        .col(ColumnDef::new(WorkflowSteps::Notes).text().null())
                        .col(
                            ColumnDef::new(WorkflowSteps::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowSteps::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkflowSteps::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_workflow_steps_request_id")
                                .from(WorkflowSteps::Table, WorkflowSteps::CustomizationRequestId)
                                .to(CustomizationRequests::Table, CustomizationRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_workflow_steps_request_order")
                        .table(WorkflowSteps::Table)
                        .col(WorkflowSteps::CustomizationRequestId)
                        .col(WorkflowSteps::StepOrder)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomizationComments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomizationComments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationComments::CustomizationRequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationComments::AuthorId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationComments::Comment)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomizationComments::IsInternal)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CustomizationComments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customization_comments_request_id")
                                .from(
                                    CustomizationComments::Table,
                                    CustomizationComments::CustomizationRequestId,
                                )
                                .to(CustomizationRequests::Table, CustomizationRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomizationComments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WorkflowSteps::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CustomizationRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CustomizationRequests {
        Table,
        Id,
        OrderItemId,
        RequestedBy,
        RequestType,
        Title,
        Description,
        Specifications,
        Status,
        Priority,
        EstimatedCost,
        EstimatedDays,
        AssignedTo,
        ReviewedBy,
        ReviewNotes,
        ApprovedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum WorkflowSteps {
        Table,
        Id,
        CustomizationRequestId,
        StepName,
        StepOrder,
        Status,
        AssignedTo,
        Notes,
        CompletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CustomizationComments {
        Table,
        Id,
        CustomizationRequestId,
        AuthorId,
        Comment,
        IsInternal,
        CreatedAt,
    }
}

mod m20240601_000007_create_fulfillment_tasks_table {

    use super::m20240601_000003_create_orders_tables::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000007_create_fulfillment_tasks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FulfillmentTasks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FulfillmentTasks::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FulfillmentTasks::OrderId).uuid().not_null())
                        .col(ColumnDef::new(FulfillmentTasks::TaskType).string().not_null())
                        .col(
                            ColumnDef::new(FulfillmentTasks::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(FulfillmentTasks::Priority)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(FulfillmentTasks::AssignedTo).uuid().null())
                        .col(ColumnDef::new(FulfillmentTasks::Notes).text().null())
                        .col(
                            ColumnDef::new(FulfillmentTasks::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(FulfillmentTasks::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FulfillmentTasks::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_fulfillment_tasks_order_id")
                                .from(FulfillmentTasks::Table, FulfillmentTasks::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FulfillmentTasks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum FulfillmentTasks {
        Table,
        Id,
        OrderId,
        TaskType,
        Status,
        Priority,
        AssignedTo,
        Notes,
        CompletedAt,
        CreatedAt,
        UpdatedAt,
    }
}
