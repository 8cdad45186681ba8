//! Fixed notification texts, one variant per kind of event, each in Arabic and English.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use entity::{appointment_status::AppointmentStatus, locale::Locale};

const DATE: &str = "%Y-%m-%d";
const TIME: &str = "%H:%M";

/// A title and message ready to be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub title: String,
    pub message: String,
}

impl Rendered {
    fn new(title: &str, message: String) -> Self {
        Self {
            title: title.to_string(),
            message,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Template<'a> {
    /// To the client: their booking is now in `status`
    Booking {
        status: AppointmentStatus,
        service: &'a str,
        date: NaiveDate,
        time: NaiveTime,
    },
    /// To the client: their booking moved
    BookingUpdated {
        service: &'a str,
        old_date: NaiveDate,
        old_time: NaiveTime,
        new_date: NaiveDate,
        new_time: NaiveTime,
    },
    /// To admins
    NewBooking {
        client_name: &'a str,
        service: &'a str,
        date: NaiveDate,
        time: NaiveTime,
    },
    /// To admins
    ClientCancelled {
        client_name: &'a str,
        service: &'a str,
        date: NaiveDate,
        time: NaiveTime,
    },
    /// To admins
    ClientRescheduled {
        client_name: &'a str,
        service: &'a str,
        old_date: NaiveDate,
        old_time: NaiveTime,
        new_date: NaiveDate,
        new_time: NaiveTime,
    },
    /// To the assigned staff member
    StaffAssignment { date: NaiveDate, time: NaiveTime },
    /// To every client
    Announcement { message: &'a str },
    /// To admins
    FeedbackReceived {
        client_name: &'a str,
        rating: i16,
        comment: Option<&'a str>,
    },
    /// To admins
    CheckIn {
        staff_name: &'a str,
        at: NaiveDateTime,
    },
    /// To admins
    CheckOut {
        staff_name: &'a str,
        at: NaiveDateTime,
    },
}

impl Template<'_> {
    pub fn render(&self, locale: Locale) -> Rendered {
        match locale {
            Locale::Ar => self.render_ar(),
            Locale::En => self.render_en(),
        }
    }

    fn render_ar(&self) -> Rendered {
        match *self {
            Template::Booking {
                status,
                service,
                date,
                time,
            } => {
                let (date, time) = (date.format(DATE), time.format(TIME));
                match status {
                    AppointmentStatus::Confirmed => Rendered::new(
                        "تم تأكيد الحجز",
                        format!("تم تأكيد حجزك لـ {service} بتاريخ {date} الساعة {time}."),
                    ),
                    AppointmentStatus::Cancelled => Rendered::new(
                        "تم إلغاء الحجز",
                        format!("تم إلغاء حجزك لـ {service} بتاريخ {date} الساعة {time}."),
                    ),
                    AppointmentStatus::Pending => Rendered::new(
                        "الحجز قيد المراجعة",
                        format!("حجزك لـ {service} بتاريخ {date} الساعة {time} قيد المراجعة."),
                    ),
                    AppointmentStatus::Completed => Rendered::new(
                        "تم الانتهاء من الحجز",
                        format!("تم الانتهاء من حجزك لـ {service} بتاريخ {date} الساعة {time}."),
                    ),
                }
            }
            Template::BookingUpdated {
                service,
                old_date,
                old_time,
                new_date,
                new_time,
            } => Rendered::new(
                "تم تعديل الحجز",
                format!(
                    "تم تعديل حجزك لـ {service} من التاريخ {} الساعة {} إلى {} الساعة {}.",
                    old_date.format(DATE),
                    old_time.format(TIME),
                    new_date.format(DATE),
                    new_time.format(TIME)
                ),
            ),
            Template::NewBooking {
                client_name,
                service,
                date,
                time,
            } => Rendered::new(
                "حجز جديد",
                format!(
                    "قام العميل {client_name} بحجز موعد لخدمة {service} بتاريخ {} الساعة {}.",
                    date.format(DATE),
                    time.format(TIME)
                ),
            ),
            Template::ClientCancelled {
                client_name,
                service,
                date,
                time,
            } => Rendered::new(
                "تم إلغاء الحجز",
                format!(
                    "قام العميل {client_name} بإلغاء موعده لخدمة {service} بتاريخ {} في تمام الساعة {}.",
                    date.format(DATE),
                    time.format(TIME)
                ),
            ),
            Template::ClientRescheduled {
                client_name,
                service,
                old_date,
                old_time,
                new_date,
                new_time,
            } => Rendered::new(
                "تعديل حجز",
                format!(
                    "قام العميل {client_name} بتعديل موعده لخدمة {service} من {} الساعة {} إلى {} الساعة {}.",
                    old_date.format(DATE),
                    old_time.format(TIME),
                    new_date.format(DATE),
                    new_time.format(TIME)
                ),
            ),
            Template::StaffAssignment { date, time } => Rendered::new(
                "تم تعيين موعد جديد",
                format!(
                    "تم تعيينك لموعد في تاريخ {} الساعة {}.",
                    date.format(DATE),
                    time.format(TIME)
                ),
            ),
            Template::Announcement { message } => {
                Rendered::new("إعلان جديد", format!("إعلان جديد: {message}"))
            }
            Template::FeedbackReceived {
                client_name,
                rating,
                comment,
            } => Rendered::new(
                "تم استلام تقييم جديد",
                match comment {
                    Some(comment) => format!("تقييم جديد من {client_name} ({rating}/5): {comment}"),
                    None => format!("تقييم جديد من {client_name} ({rating}/5)."),
                },
            ),
            Template::CheckIn { staff_name, at } => Rendered::new(
                "إشعار تسجيل دخول",
                format!(
                    "قام الموظف {staff_name} بتسجيل الدخول بتاريخ {} الساعة {}.",
                    at.format(DATE),
                    at.format(TIME)
                ),
            ),
            Template::CheckOut { staff_name, at } => Rendered::new(
                "إشعار تسجيل خروج",
                format!(
                    "قام الموظف {staff_name} بتسجيل الخروج بتاريخ {} الساعة {}.",
                    at.format(DATE),
                    at.format(TIME)
                ),
            ),
        }
    }

    fn render_en(&self) -> Rendered {
        match *self {
            Template::Booking {
                status,
                service,
                date,
                time,
            } => {
                let (date, time) = (date.format(DATE), time.format(TIME));
                match status {
                    AppointmentStatus::Confirmed => Rendered::new(
                        "Booking confirmed",
                        format!("Your booking for {service} on {date} at {time} has been confirmed."),
                    ),
                    AppointmentStatus::Cancelled => Rendered::new(
                        "Booking cancelled",
                        format!("Your booking for {service} on {date} at {time} has been cancelled."),
                    ),
                    AppointmentStatus::Pending => Rendered::new(
                        "Booking under review",
                        format!("Your booking for {service} on {date} at {time} is under review."),
                    ),
                    AppointmentStatus::Completed => Rendered::new(
                        "Booking completed",
                        format!("Your booking for {service} on {date} at {time} has been completed."),
                    ),
                }
            }
            Template::BookingUpdated {
                service,
                old_date,
                old_time,
                new_date,
                new_time,
            } => Rendered::new(
                "Booking updated",
                format!(
                    "Your booking for {service} has been moved from {} at {} to {} at {}.",
                    old_date.format(DATE),
                    old_time.format(TIME),
                    new_date.format(DATE),
                    new_time.format(TIME)
                ),
            ),
            Template::NewBooking {
                client_name,
                service,
                date,
                time,
            } => Rendered::new(
                "New booking",
                format!(
                    "Client {client_name} booked {service} on {} at {}.",
                    date.format(DATE),
                    time.format(TIME)
                ),
            ),
            Template::ClientCancelled {
                client_name,
                service,
                date,
                time,
            } => Rendered::new(
                "Booking cancelled",
                format!(
                    "Client {client_name} cancelled their {service} appointment on {} at {}.",
                    date.format(DATE),
                    time.format(TIME)
                ),
            ),
            Template::ClientRescheduled {
                client_name,
                service,
                old_date,
                old_time,
                new_date,
                new_time,
            } => Rendered::new(
                "Booking changed",
                format!(
                    "Client {client_name} moved their {service} appointment from {} at {} to {} at {}.",
                    old_date.format(DATE),
                    old_time.format(TIME),
                    new_date.format(DATE),
                    new_time.format(TIME)
                ),
            ),
            Template::StaffAssignment { date, time } => Rendered::new(
                "New appointment assigned",
                format!(
                    "You have been assigned an appointment on {} at {}.",
                    date.format(DATE),
                    time.format(TIME)
                ),
            ),
            Template::Announcement { message } => {
                Rendered::new("New announcement", format!("New announcement: {message}"))
            }
            Template::FeedbackReceived {
                client_name,
                rating,
                comment,
            } => Rendered::new(
                "New feedback received",
                match comment {
                    Some(comment) => format!("New feedback from {client_name} ({rating}/5): {comment}"),
                    None => format!("New feedback from {client_name} ({rating}/5)."),
                },
            ),
            Template::CheckIn { staff_name, at } => Rendered::new(
                "Staff check-in",
                format!(
                    "{staff_name} checked in on {} at {}.",
                    at.format(DATE),
                    at.format(TIME)
                ),
            ),
            Template::CheckOut { staff_name, at } => Rendered::new(
                "Staff check-out",
                format!(
                    "{staff_name} checked out on {} at {}.",
                    at.format(DATE),
                    at.format(TIME)
                ),
            ),
        }
    }
}
