pub mod auth;
pub mod collections;
pub mod dashboard;
pub mod farm;
pub mod finance;
pub mod stock;

use chrono::NaiveDate;

/// "Hoje" no fuso do servidor; as rotas aceitam `?date=` para sobrescrever.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
