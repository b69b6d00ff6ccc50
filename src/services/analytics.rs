// src/services/analytics.rs
//
// Agregações puras sobre agendamentos. Nada aqui faz I/O: os serviços
// carregam as linhas e chamam estas funções.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate, Timelike};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        barber::Barber,
        booking::{Booking, PaymentMethod},
        catalog::Service,
        reports::{
            CommissionEntry, EntityBreakdown, Granularity, PaymentMethodEntry, ReportFilter,
            RevenueSummary, TimeSlotHistogram, TrendBucket,
        },
    },
};

impl ReportFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.start.is_none_or(|start| booking.booking_date >= start)
            && self.end.is_none_or(|end| booking.booking_date < end)
            && self.barber_id.is_none_or(|id| booking.barber_id == id)
            && self.service_id.is_none_or(|id| booking.service_id == id)
    }
}

pub fn filter_bookings<'a>(bookings: &'a [Booking], filter: &ReportFilter) -> Vec<&'a Booking> {
    bookings.iter().filter(|b| filter.matches(b)).collect()
}

// Percentual com divisão por zero tratada: nunca NaN nem infinito.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn decimal_share(part: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (part / total * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

fn completed_revenue<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> (usize, Decimal) {
    bookings
        .into_iter()
        .filter(|b| b.status.is_completed())
        .fold((0, Decimal::ZERO), |(count, sum), b| (count + 1, sum + b.total_price))
}

fn metrics(bookings: &[&Booking]) -> RevenueSummary {
    let total_bookings = bookings.len();
    let (completed_bookings, total_revenue) = completed_revenue(bookings.iter().copied());
    let cancelled_bookings = bookings.iter().filter(|b| b.status.is_cancelled()).count();

    let average_ticket = if completed_bookings == 0 {
        Decimal::ZERO
    } else {
        (total_revenue / Decimal::from(completed_bookings)).round_dp(2)
    };

    RevenueSummary {
        total_bookings,
        completed_bookings,
        cancelled_bookings,
        total_revenue,
        average_ticket,
        completion_rate: percentage(completed_bookings, total_bookings),
        cancellation_rate: percentage(cancelled_bookings, total_bookings),
    }
}

pub fn summarize(bookings: &[Booking], filter: &ReportFilter) -> RevenueSummary {
    metrics(&filter_bookings(bookings, filter))
}

// Entidades sem agendamentos no período ficam fora da lista.
fn breakdown<'a>(
    filtered: &[&Booking],
    entities: impl Iterator<Item = (Uuid, &'a str)>,
    key: fn(&Booking) -> Uuid,
) -> Vec<EntityBreakdown> {
    entities
        .filter_map(|(id, name)| {
            let own: Vec<&Booking> = filtered.iter().copied().filter(|b| key(b) == id).collect();
            if own.is_empty() {
                return None;
            }
            Some(EntityBreakdown {
                id,
                name: name.to_string(),
                percentage: percentage(own.len(), filtered.len()),
                metrics: metrics(&own),
            })
        })
        .collect()
}

pub fn breakdown_by_barber(
    bookings: &[Booking],
    barbers: &[Barber],
    filter: &ReportFilter,
) -> Vec<EntityBreakdown> {
    let filtered = filter_bookings(bookings, filter);
    breakdown(
        &filtered,
        barbers.iter().map(|b| (b.id, b.name.as_str())),
        |b| b.barber_id,
    )
}

pub fn breakdown_by_service(
    bookings: &[Booking],
    services: &[Service],
    filter: &ReportFilter,
) -> Vec<EntityBreakdown> {
    let filtered = filter_bookings(bookings, filter);
    breakdown(
        &filtered,
        services.iter().map(|s| (s.id, s.name.as_str())),
        |b| b.service_id,
    )
}

pub fn commissions(
    bookings: &[Booking],
    barbers: &[Barber],
    rate: Decimal,
    filter: &ReportFilter,
) -> Vec<CommissionEntry> {
    let filtered = filter_bookings(bookings, filter);

    barbers
        .iter()
        .filter_map(|barber| {
            let (services_count, revenue) =
                completed_revenue(filtered.iter().copied().filter(|b| b.barber_id == barber.id));
            if services_count == 0 {
                return None;
            }
            Some(CommissionEntry {
                barber_id: barber.id,
                barber_name: barber.name.clone(),
                services_count,
                revenue,
                rate,
                commission: (revenue * rate).round_dp(2),
            })
        })
        .collect()
}

fn bucket_bounds(
    today: NaiveDate,
    granularity: Granularity,
    back: u32,
) -> Option<(NaiveDate, NaiveDate, String)> {
    match granularity {
        Granularity::Month => {
            let first_of_month = today.with_day0(0)?;
            let start = first_of_month.checked_sub_months(Months::new(back))?;
            let end = start.checked_add_months(Months::new(1))?;
            Some((start, end, start.format("%m/%Y").to_string()))
        }
        Granularity::Day => {
            let start = today.checked_sub_days(Days::new(u64::from(back)))?;
            let end = start.checked_add_days(Days::new(1))?;
            Some((start, end, start.format("%d/%m").to_string()))
        }
    }
}

// N baldes, o mais antigo primeiro; o último contém 'today'.
// 'today' vem do relógio local de quem chama.
pub fn trend(
    bookings: &[Booking],
    buckets: u32,
    granularity: Granularity,
    today: NaiveDate,
) -> Result<Vec<TrendBucket>, AppError> {
    (0..buckets)
        .rev()
        .map(|back| {
            let (start, end, label) = bucket_bounds(today, granularity, back).ok_or_else(|| {
                AppError::InvalidInput("Intervalo de datas fora do suportado.".to_string())
            })?;

            let in_bucket: Vec<&Booking> = bookings
                .iter()
                .filter(|b| b.booking_date >= start && b.booking_date < end)
                .collect();
            let (completed, revenue) = completed_revenue(in_bucket.iter().copied());

            Ok(TrendBucket {
                label,
                start,
                end,
                bookings: in_bucket.len(),
                completed,
                revenue,
            })
        })
        .collect()
}

// Período coberto pelos N baldes: do início do mais antigo ao fim do atual.
pub fn trend_window(
    today: NaiveDate,
    buckets: u32,
    granularity: Granularity,
) -> Result<ReportFilter, AppError> {
    let out_of_range = || AppError::InvalidInput("Intervalo de datas fora do suportado.".to_string());
    let (start, _, _) = bucket_bounds(today, granularity, buckets.saturating_sub(1)).ok_or_else(out_of_range)?;
    let (_, end, _) = bucket_bounds(today, granularity, 0).ok_or_else(out_of_range)?;

    Ok(ReportFilter {
        start: Some(start),
        end: Some(end),
        ..ReportFilter::default()
    })
}

// Manhã [8,12), tarde [12,17), noite [17,20). O resto só aparece em outside_hours.
pub fn time_slots<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> TimeSlotHistogram {
    bookings
        .into_iter()
        .fold(TimeSlotHistogram::default(), |mut hist, booking| {
            match booking.booking_time.hour() {
                8..=11 => hist.morning += 1,
                12..=16 => hist.afternoon += 1,
                17..=19 => hist.evening += 1,
                _ => hist.outside_hours += 1,
            }
            hist
        })
}

pub fn payment_methods<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
) -> Vec<PaymentMethodEntry> {
    let mut groups: BTreeMap<Option<PaymentMethod>, (usize, Decimal)> = BTreeMap::new();
    let mut total = Decimal::ZERO;

    for booking in bookings.into_iter().filter(|b| b.status.is_completed()) {
        let entry = groups.entry(booking.payment_method).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += booking.total_price;
        total += booking.total_price;
    }

    groups
        .into_iter()
        .map(|(method, (count, revenue))| PaymentMethodEntry {
            method: method.map_or("nao_informado", PaymentMethod::label).to_string(),
            count,
            revenue,
            percentage: decimal_share(revenue, total),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::booking::BookingStatus;
    use chrono::{NaiveTime, Utc};

    pub(crate) fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn booking(price: &str, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            barber_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            booking_date: date(2026, 10, 19),
            booking_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status,
            total_price: dec(price),
            payment_method: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn at(mut b: Booking, day: NaiveDate, hour: u32) -> Booking {
        b.booking_date = day;
        b.booking_time = NaiveTime::from_hms_opt(hour, 30, 0).unwrap();
        b
    }

    pub(crate) fn barber(name: &str) -> Barber {
        Barber {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: None,
            rating: dec("4.5"),
            experience_years: 3,
            specialties: vec![],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn service(name: &str, price: &str) -> Service {
        Service {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: dec(price),
            duration_minutes: 30,
            description: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn completed_and_cancelled_example() {
        let bookings = vec![
            booking("100", BookingStatus::Concluido),
            booking("50", BookingStatus::Cancelado),
        ];
        let summary = summarize(&bookings, &ReportFilter::default());

        assert_eq!(summary.total_revenue, dec("100"));
        assert_eq!(summary.completed_bookings, 1);
        assert_eq!(summary.cancelled_bookings, 1);
        assert_eq!(summary.average_ticket, dec("100"));
        assert_eq!(summary.completion_rate, 50.0);
        assert_eq!(summary.cancellation_rate, 50.0);
    }

    #[test]
    fn average_ticket_is_zero_without_completed_bookings() {
        let bookings = vec![
            booking("80", BookingStatus::Agendado),
            booking("40", BookingStatus::Cancelado),
            booking("30", BookingStatus::EmAndamento),
        ];
        let summary = summarize(&bookings, &ReportFilter::default());
        assert_eq!(summary.average_ticket, Decimal::ZERO);
        assert_eq!(summary.total_revenue, Decimal::ZERO);

        let empty = summarize(&[], &ReportFilter::default());
        assert_eq!(empty.average_ticket, Decimal::ZERO);
        assert_eq!(empty.completion_rate, 0.0);
        assert_eq!(empty.cancellation_rate, 0.0);
    }

    #[test]
    fn completion_rate_is_exact_ratio_and_excludes_pending() {
        let bookings = vec![
            booking("10", BookingStatus::Concluido),
            booking("10", BookingStatus::Confirmado),
            booking("10", BookingStatus::Agendado),
        ];
        let summary = summarize(&bookings, &ReportFilter::default());
        assert_eq!(summary.completion_rate, 1.0 / 3.0 * 100.0);
        assert!(summary.completion_rate + summary.cancellation_rate < 100.0);
    }

    #[test]
    fn filter_uses_inclusive_start_and_exclusive_end() {
        let bookings = vec![
            at(booking("10", BookingStatus::Concluido), date(2026, 10, 1), 10),
            at(booking("20", BookingStatus::Concluido), date(2026, 10, 31), 10),
            at(booking("40", BookingStatus::Concluido), date(2026, 11, 1), 10),
        ];
        let filter = ReportFilter {
            start: Some(date(2026, 10, 1)),
            end: Some(date(2026, 11, 1)),
            ..Default::default()
        };
        let summary = summarize(&bookings, &filter);
        assert_eq!(summary.total_bookings, 2);
        assert_eq!(summary.total_revenue, dec("30"));
    }

    #[test]
    fn breakdown_skips_entities_without_bookings() {
        let ana = barber("Ana");
        let bruno = barber("Bruno");
        let ocioso = barber("Ocioso");

        let mut b1 = booking("50", BookingStatus::Concluido);
        b1.barber_id = ana.id;
        let mut b2 = booking("30", BookingStatus::Cancelado);
        b2.barber_id = ana.id;
        let mut b3 = booking("70", BookingStatus::Concluido);
        b3.barber_id = bruno.id;
        let mut b4 = booking("70", BookingStatus::Concluido);
        b4.barber_id = bruno.id;

        let rows = breakdown_by_barber(
            &[b1, b2, b3, b4],
            &[ana.clone(), bruno.clone(), ocioso],
            &ReportFilter::default(),
        );

        assert_eq!(rows.len(), 2);
        let ana_row = rows.iter().find(|r| r.id == ana.id).unwrap();
        assert_eq!(ana_row.percentage, 50.0);
        assert_eq!(ana_row.metrics.total_revenue, dec("50"));
        assert_eq!(ana_row.metrics.completion_rate, 50.0);

        let bruno_row = rows.iter().find(|r| r.id == bruno.id).unwrap();
        assert_eq!(bruno_row.metrics.average_ticket, dec("70"));
    }

    #[test]
    fn service_breakdown_respects_period() {
        let corte = service("Corte", "40");
        let mut inside = at(booking("40", BookingStatus::Concluido), date(2026, 10, 10), 9);
        inside.service_id = corte.id;
        let mut outside = at(booking("40", BookingStatus::Concluido), date(2026, 9, 10), 9);
        outside.service_id = corte.id;

        let filter = ReportFilter { start: Some(date(2026, 10, 1)), ..Default::default() };
        let rows = breakdown_by_service(&[inside, outside], &[corte], &filter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metrics.total_bookings, 1);
        assert_eq!(rows[0].percentage, 100.0);
    }

    #[test]
    fn commission_uses_configured_rate_on_completed_revenue() {
        let ana = barber("Ana");
        let mut done = booking("100", BookingStatus::Concluido);
        done.barber_id = ana.id;
        let mut done2 = booking("45.50", BookingStatus::Concluido);
        done2.barber_id = ana.id;
        let mut cancelled = booking("500", BookingStatus::Cancelado);
        cancelled.barber_id = ana.id;

        let entries = commissions(
            &[done, done2, cancelled],
            &[ana.clone(), barber("Sem agenda")],
            dec("0.40"),
            &ReportFilter::default(),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].services_count, 2);
        assert_eq!(entries[0].revenue, dec("145.50"));
        assert_eq!(entries[0].commission, dec("58.20"));

        let half = commissions(
            &[at(booking("10", BookingStatus::Concluido), date(2026, 1, 1), 9)]
                .map(|mut b| {
                    b.barber_id = ana.id;
                    b
                }),
            &[ana],
            dec("0.5"),
            &ReportFilter::default(),
        );
        assert_eq!(half[0].commission, dec("5"));
    }

    #[test]
    fn monthly_trend_without_bookings_has_exact_length() {
        let buckets = trend(&[], 6, Granularity::Month, date(2026, 10, 19)).unwrap();
        assert_eq!(buckets.len(), 6);
        for bucket in &buckets {
            assert_eq!(bucket.bookings, 0);
            assert_eq!(bucket.completed, 0);
            assert_eq!(bucket.revenue, Decimal::ZERO);
        }
        assert_eq!(buckets[0].label, "05/2026");
        assert_eq!(buckets[5].label, "10/2026");
        assert_eq!(buckets[5].end, date(2026, 11, 1));
    }

    #[test]
    fn monthly_trend_respects_month_edges() {
        let bookings = vec![
            at(booking("30", BookingStatus::Concluido), date(2026, 9, 30), 19),
            at(booking("40", BookingStatus::Concluido), date(2026, 10, 1), 8),
            at(booking("50", BookingStatus::Cancelado), date(2026, 10, 31), 12),
        ];
        let buckets = trend(&bookings, 2, Granularity::Month, date(2026, 10, 19)).unwrap();

        assert_eq!(buckets[0].start, date(2026, 9, 1));
        assert_eq!(buckets[0].bookings, 1);
        assert_eq!(buckets[0].revenue, dec("30"));
        assert_eq!(buckets[1].bookings, 2);
        assert_eq!(buckets[1].completed, 1);
        assert_eq!(buckets[1].revenue, dec("40"));
    }

    #[test]
    fn monthly_trend_crosses_year_boundary() {
        let buckets = trend(&[], 3, Granularity::Month, date(2026, 1, 31)).unwrap();
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["11/2025", "12/2025", "01/2026"]);
    }

    #[test]
    fn daily_trend_ends_today() {
        let bookings = vec![
            at(booking("25", BookingStatus::Concluido), date(2026, 10, 19), 10),
            at(booking("25", BookingStatus::Concluido), date(2026, 10, 13), 10),
        ];
        let buckets = trend(&bookings, 7, Granularity::Day, date(2026, 10, 19)).unwrap();
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].label, "13/10");
        assert_eq!(buckets[0].bookings, 1);
        assert_eq!(buckets[6].label, "19/10");
        assert_eq!(buckets[6].revenue, dec("25"));
        assert!(buckets[1..6].iter().all(|b| b.bookings == 0));
    }

    #[test]
    fn trend_window_spans_oldest_to_current_bucket() {
        let today = date(2026, 10, 19);

        let months = trend_window(today, 6, Granularity::Month).unwrap();
        assert_eq!(months.start, Some(date(2026, 5, 1)));
        assert_eq!(months.end, Some(date(2026, 11, 1)));
        assert!(months.barber_id.is_none() && months.service_id.is_none());

        let days = trend_window(today, 7, Granularity::Day).unwrap();
        assert_eq!(days.start, Some(date(2026, 10, 13)));
        assert_eq!(days.end, Some(date(2026, 10, 20)));

        // Os baldes calculados cabem exatamente na janela
        let buckets = trend(&[], 6, Granularity::Month, today).unwrap();
        assert_eq!(buckets.first().map(|b| b.start), months.start);
        assert_eq!(buckets.last().map(|b| b.end), months.end);
    }

    #[test]
    fn zero_buckets_is_empty() {
        assert!(trend(&[], 0, Granularity::Day, date(2026, 10, 19)).unwrap().is_empty());
    }

    #[test]
    fn time_slots_drop_out_of_range_hours() {
        let day = date(2026, 10, 19);
        let bookings = vec![
            at(booking("1", BookingStatus::Agendado), day, 8),
            at(booking("1", BookingStatus::Agendado), day, 11),
            at(booking("1", BookingStatus::Agendado), day, 12),
            at(booking("1", BookingStatus::Agendado), day, 16),
            at(booking("1", BookingStatus::Agendado), day, 17),
            at(booking("1", BookingStatus::Agendado), day, 19),
            at(booking("1", BookingStatus::Agendado), day, 7),
            at(booking("1", BookingStatus::Agendado), day, 20),
        ];
        let hist = time_slots(&bookings);

        assert_eq!(hist.morning, 2);
        assert_eq!(hist.afternoon, 2);
        assert_eq!(hist.evening, 2);
        assert_eq!(hist.outside_hours, 2);
        assert!(hist.classified() < bookings.len());
    }

    #[test]
    fn time_slots_sum_never_exceeds_total() {
        let day = date(2026, 10, 19);
        let bookings: Vec<Booking> = (0..24)
            .map(|h| at(booking("1", BookingStatus::Agendado), day, h))
            .collect();
        let hist = time_slots(&bookings);
        assert!(hist.classified() <= bookings.len());
        assert_eq!(hist.classified() + hist.outside_hours, bookings.len());

        let inside: Vec<Booking> = (8..20)
            .map(|h| at(booking("1", BookingStatus::Agendado), day, h))
            .collect();
        assert_eq!(time_slots(&inside).classified(), inside.len());
    }

    #[test]
    fn payment_methods_group_completed_revenue() {
        let mut pix = booking("60", BookingStatus::Concluido);
        pix.payment_method = Some(PaymentMethod::Pix);
        let mut cash = booking("20", BookingStatus::Concluido);
        cash.payment_method = Some(PaymentMethod::Dinheiro);
        let unknown = booking("20", BookingStatus::Concluido);
        let mut cancelled = booking("999", BookingStatus::Cancelado);
        cancelled.payment_method = Some(PaymentMethod::Pix);

        let rows = payment_methods(&[pix, cash, unknown, cancelled]);
        assert_eq!(rows.len(), 3);

        let pix_row = rows.iter().find(|r| r.method == "pix").unwrap();
        assert_eq!(pix_row.count, 1);
        assert_eq!(pix_row.revenue, dec("60"));
        assert_eq!(pix_row.percentage, 60.0);

        assert!(rows.iter().any(|r| r.method == "nao_informado"));
        assert!(payment_methods(Vec::<Booking>::new().iter()).is_empty());
    }
}
