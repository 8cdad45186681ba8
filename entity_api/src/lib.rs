use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub use entity::{
    announcements, appointment_status, appointments, locale, notifications, roles, services,
    users, Id,
};

pub mod announcement;
pub mod appointment;
pub mod error;
pub mod feedback;
pub mod notification;
pub mod query;
pub mod service;
pub mod user;

/// Populates an empty database with a small salon: one user per role and a few services.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let staff = [
        ("Noura Al-Harbi", "noura@salon.local", roles::Role::Admin),
        ("Reem Al-Qahtani", "reem@salon.local", roles::Role::Staff),
        ("Sara Al-Otaibi", "sara@salon.local", roles::Role::Client),
    ];

    for (full_name, email, role) in staff {
        user::create(
            db,
            user::NewUser {
                full_name: full_name.to_owned(),
                email: email.to_owned(),
                password: "password".to_owned(),
                role,
                locale: locale::Locale::Ar,
            },
        )
        .await?;
    }

    let now = Utc::now();
    let catalogue = [
        ("قص الشعر", Decimal::new(8000, 2)),
        ("صبغة", Decimal::new(25000, 2)),
        ("مانيكير", Decimal::new(6000, 2)),
    ];

    for (name, price) in catalogue {
        services::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(None),
            price: Set(price),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
