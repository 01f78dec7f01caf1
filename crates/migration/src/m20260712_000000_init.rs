//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the service:
//!
//! - `users`: authentication
//! - `centers`: wash locations owned by users
//! - `customers`: loyalty aggregates keyed by phone
//! - `customer_vehicles`: plates registered per customer
//! - `service_types`: per-center service catalog (base prices)
//! - `vehicle_types`: per-center size classes (price multipliers)
//! - `wash_sessions`: bookings with lifecycle flags and pricing
//! - `payments`: one payment record per session

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Centers {
    Table,
    Id,
    Name,
    UserId,
    Currency,
    LoyaltyDiscountPercent,
}

#[derive(Iden)]
enum Customers {
    Table,
    Phone,
    Name,
    Email,
    CreatedAt,
    LastVisit,
    TotalCompletedBookings,
    TotalAmountSpentMinor,
    IsActive,
}

#[derive(Iden)]
enum CustomerVehicles {
    Table,
    Phone,
    Plate,
}

#[derive(Iden)]
enum ServiceTypes {
    Table,
    Id,
    CenterId,
    Name,
    BasePriceMinor,
    Currency,
    Active,
}

#[derive(Iden)]
enum VehicleTypes {
    Table,
    Id,
    CenterId,
    Name,
    Multiplier,
    Active,
}

#[derive(Iden)]
enum WashSessions {
    Table,
    Id,
    CenterId,
    ServiceId,
    VehicleTypeId,
    CustomerPhone,
    CustomerName,
    Plate,
    Brand,
    Color,
    BasePriceMinor,
    VehicleMultiplier,
    PriceMinor,
    LoyaltyDiscountMinor,
    LoyaltyDiscountApplied,
    AmountPaidMinor,
    PaymentMethod,
    TransactionRef,
    IsPaid,
    IsCompleted,
    IsCancelled,
    ScheduledStart,
    ActualStart,
    ActualEnd,
    DurationMinutes,
    Rating,
    Feedback,
    CancellationReason,
    Currency,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    SessionId,
    CenterId,
    AmountMinor,
    Method,
    TransactionRef,
    PaidAt,
    ReceivedBy,
    IsVerified,
    Currency,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Centers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Centers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Centers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Centers::Name).string().not_null())
                    .col(ColumnDef::new(Centers::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Centers::Currency)
                            .string()
                            .not_null()
                            .default("GHS"),
                    )
                    .col(
                        ColumnDef::new(Centers::LoyaltyDiscountPercent)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-centers-user_id")
                            .from(Centers::Table, Centers::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Customers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Phone)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string())
                    .col(ColumnDef::new(Customers::Email).string())
                    .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Customers::LastVisit).timestamp())
                    .col(
                        ColumnDef::new(Customers::TotalCompletedBookings)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::TotalAmountSpentMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Customers::IsActive).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Customer Vehicles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CustomerVehicles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CustomerVehicles::Phone).string().not_null())
                    .col(ColumnDef::new(CustomerVehicles::Plate).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(CustomerVehicles::Phone)
                            .col(CustomerVehicles::Plate),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-customer_vehicles-phone")
                            .from(CustomerVehicles::Table, CustomerVehicles::Phone)
                            .to(Customers::Table, Customers::Phone)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Service Types
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ServiceTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceTypes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceTypes::CenterId).string().not_null())
                    .col(ColumnDef::new(ServiceTypes::Name).string().not_null())
                    .col(
                        ColumnDef::new(ServiceTypes::BasePriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceTypes::Currency)
                            .string()
                            .not_null()
                            .default("GHS"),
                    )
                    .col(ColumnDef::new(ServiceTypes::Active).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-service_types-center_id")
                            .from(ServiceTypes::Table, ServiceTypes::CenterId)
                            .to(Centers::Table, Centers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-service_types-center_id-name-unique")
                    .table(ServiceTypes::Table)
                    .col(ServiceTypes::CenterId)
                    .col(ServiceTypes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Vehicle Types
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(VehicleTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleTypes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VehicleTypes::CenterId).string().not_null())
                    .col(ColumnDef::new(VehicleTypes::Name).string().not_null())
                    .col(
                        ColumnDef::new(VehicleTypes::Multiplier)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleTypes::Active).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vehicle_types-center_id")
                            .from(VehicleTypes::Table, VehicleTypes::CenterId)
                            .to(Centers::Table, Centers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicle_types-center_id-name-unique")
                    .table(VehicleTypes::Table)
                    .col(VehicleTypes::CenterId)
                    .col(VehicleTypes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Wash Sessions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(WashSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WashSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WashSessions::CenterId).string().not_null())
                    .col(ColumnDef::new(WashSessions::ServiceId).string().not_null())
                    .col(
                        ColumnDef::new(WashSessions::VehicleTypeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::CustomerPhone)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WashSessions::CustomerName).string())
                    .col(ColumnDef::new(WashSessions::Plate).string().not_null())
                    .col(ColumnDef::new(WashSessions::Brand).string())
                    .col(ColumnDef::new(WashSessions::Color).string())
                    .col(
                        ColumnDef::new(WashSessions::BasePriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::VehicleMultiplier)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::PriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::LoyaltyDiscountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::LoyaltyDiscountApplied)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::AmountPaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WashSessions::PaymentMethod).string())
                    .col(ColumnDef::new(WashSessions::TransactionRef).string())
                    .col(ColumnDef::new(WashSessions::IsPaid).boolean().not_null())
                    .col(
                        ColumnDef::new(WashSessions::IsCompleted)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::IsCancelled)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WashSessions::ScheduledStart)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WashSessions::ActualStart).timestamp())
                    .col(ColumnDef::new(WashSessions::ActualEnd).timestamp())
                    .col(ColumnDef::new(WashSessions::DurationMinutes).big_integer())
                    .col(ColumnDef::new(WashSessions::Rating).integer())
                    .col(ColumnDef::new(WashSessions::Feedback).string())
                    .col(ColumnDef::new(WashSessions::CancellationReason).string())
                    .col(ColumnDef::new(WashSessions::Currency).string().not_null())
                    .col(ColumnDef::new(WashSessions::CreatedBy).string().not_null())
                    .col(ColumnDef::new(WashSessions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(WashSessions::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wash_sessions-center_id")
                            .from(WashSessions::Table, WashSessions::CenterId)
                            .to(Centers::Table, Centers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wash_sessions-center_id-scheduled_start")
                    .table(WashSessions::Table)
                    .col(WashSessions::CenterId)
                    .col(WashSessions::ScheduledStart)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wash_sessions-customer_phone")
                    .table(WashSessions::Table)
                    .col(WashSessions::CustomerPhone)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::SessionId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::CenterId).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(ColumnDef::new(Payments::TransactionRef).string())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                    .col(ColumnDef::new(Payments::ReceivedBy).string().not_null())
                    .col(ColumnDef::new(Payments::IsVerified).boolean().not_null())
                    .col(ColumnDef::new(Payments::Currency).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-session_id")
                            .from(Payments::Table, Payments::SessionId)
                            .to(WashSessions::Table, WashSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-center_id")
                    .table(Payments::Table)
                    .col(Payments::CenterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WashSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerVehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Centers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
