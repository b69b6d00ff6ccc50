// src/models/settings.rs

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{error::AppError, validation::validate_rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub closed: bool,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub open: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "19:00:00")]
    pub close: Option<NaiveTime>,
}

impl DaySchedule {
    pub fn open_between(open: NaiveTime, close: NaiveTime) -> Self {
        Self { closed: false, open: Some(open), close: Some(close) }
    }

    pub fn closed() -> Self {
        Self { closed: true, open: None, close: None }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        match (self.closed, self.open, self.close) {
            (false, Some(open), Some(close)) => time >= open && time < close,
            _ => false,
        }
    }
}

// Sete campos fixos: não existe dia "inválido" para indexar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub monday: DaySchedule,
    pub tuesday: DaySchedule,
    pub wednesday: DaySchedule,
    pub thursday: DaySchedule,
    pub friday: DaySchedule,
    pub saturday: DaySchedule,
    pub sunday: DaySchedule,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for OpeningHours {
    fn default() -> Self {
        let weekday = DaySchedule::open_between(hm(9, 0), hm(19, 0));
        Self {
            monday: weekday.clone(),
            tuesday: weekday.clone(),
            wednesday: weekday.clone(),
            thursday: weekday.clone(),
            friday: weekday,
            saturday: DaySchedule::open_between(hm(8, 0), hm(17, 0)),
            sunday: DaySchedule::closed(),
        }
    }
}

impl OpeningHours {
    pub fn day(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let days = [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ];

        for (name, day) in days {
            if day.closed {
                continue;
            }
            match (day.open, day.close) {
                (Some(open), Some(close)) if open < close => {}
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "Horário de funcionamento inválido para '{}'.",
                        name
                    )))
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSettings {
    #[schema(example = "Barbearia do Zé")]
    pub business_name: String,

    #[schema(example = "(11) 3333-4444")]
    pub phone: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: Option<String>,

    // Fração da receita concluída paga ao barbeiro
    #[schema(example = "0.40")]
    pub commission_rate: Decimal,

    #[schema(value_type = OpeningHours)]
    pub opening_hours: Json<OpeningHours>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl BusinessSettings {
    // Usado quando ainda não existe linha em 'business_settings'
    pub fn with_defaults(commission_rate: Decimal) -> Self {
        Self {
            business_name: "Minha Barbearia".to_string(),
            phone: None,
            address: None,
            commission_rate,
            opening_hours: Json(OpeningHours::default()),
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, message = "O nome da barbearia é obrigatório."))]
    pub business_name: String,

    pub phone: Option<String>,
    pub address: Option<String>,

    #[validate(custom(function = "validate_rate"))]
    #[schema(example = "0.40")]
    pub commission_rate: Decimal,

    pub opening_hours: OpeningHours,
}
