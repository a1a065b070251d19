use html_escape::encode_text;

use super::gateway::EmailMessage;
use crate::booking::{Booking, ConsultationType};
use crate::config::CounselorContact;

/// The booking and the person who made it.
#[derive(Debug, Clone, Copy)]
pub struct BookingNotice<'a> {
    pub booking: &'a Booking,
    pub user_name: &'a str,
    pub user_email: &'a str,
}

impl BookingNotice<'_> {
    fn long_date(&self) -> String {
        self.booking.session_date.format("%A, %B %d, %Y").to_string()
    }

    fn short_date(&self) -> String {
        self.booking.session_date.format("%B %d, %Y").to_string()
    }

    fn time(&self) -> String {
        self.booking.session_time.format("%I:%M %p").to_string()
    }
}

fn session_logistics(kind: ConsultationType, counselor: &CounselorContact) -> String {
    match kind {
        ConsultationType::Video => {
            "Meeting: a secure video call link will be sent 30 minutes before the session."
                .to_string()
        }
        ConsultationType::InPerson => format!("Location: {}", counselor.clinic_location),
    }
}

pub fn whatsapp_confirmation(notice: &BookingNotice<'_>, counselor: &CounselorContact) -> String {
    format!(
        "MindMetric - Booking Confirmed\n\n\
         Hello {name}! Your psychology session has been booked.\n\n\
         Date: {date}\n\
         Time: {time}\n\
         Type: {kind}\n\
         Psychologist: {counselor}\n\n\
         {logistics}\n\n\
         Please arrive 5 minutes early and contact us if you need to reschedule.\n\n\
         This is an automated message. Reply STOP to opt out.",
        name = notice.user_name,
        date = notice.short_date(),
        time = notice.time(),
        kind = notice.booking.consultation_type.label(),
        counselor = counselor.name,
        logistics = session_logistics(notice.booking.consultation_type, counselor),
    )
}

pub fn confirmation_email(
    notice: &BookingNotice<'_>,
    counselor: &CounselorContact,
    from: &str,
) -> EmailMessage {
    let kind = notice.booking.consultation_type;
    let instructions = match kind {
        ConsultationType::Video => "<h4>Video Call Instructions</h4>\
             <p>You will receive a secure video call link 30 minutes before your session. \
             Please make sure you have a stable internet connection and a quiet space.</p>"
            .to_string(),
        ConsultationType::InPerson => format!(
            "<h4>In-Person Session</h4><p><strong>Location:</strong> {}</p>\
             <p>Please arrive 5 minutes early for check-in.</p>",
            encode_text(&counselor.clinic_location)
        ),
    };

    let html = format!(
        "<!DOCTYPE html>\n<html><body>\n\
         <h1>Booking Confirmed</h1>\n\
         <p>Dear {name},</p>\n\
         <p>Thank you for booking your psychology session with MindMetric.</p>\n\
         <ul>\n\
         <li><strong>Date:</strong> {date}</li>\n\
         <li><strong>Time:</strong> {time}</li>\n\
         <li><strong>Consultation Type:</strong> {kind}</li>\n\
         <li><strong>Psychologist:</strong> {counselor}</li>\n\
         </ul>\n\
         {instructions}\n\
         <p>Contact us at least 24 hours in advance if you need to reschedule.</p>\n\
         <p>Warm regards,<br><strong>The MindMetric Team</strong></p>\n\
         </body></html>",
        name = encode_text(notice.user_name),
        date = notice.long_date(),
        time = notice.time(),
        kind = kind.label(),
        counselor = encode_text(&counselor.name),
    );

    let text = format!(
        "MindMetric - Booking Confirmed\n\n\
         Dear {name},\n\n\
         Your psychology session has been booked:\n\n\
         Date: {date}\n\
         Time: {time}\n\
         Type: {kind}\n\
         Psychologist: {counselor}\n\n\
         {logistics}\n\n\
         Thank you for choosing MindMetric.",
        name = notice.user_name,
        date = notice.long_date(),
        time = notice.time(),
        kind = kind.label(),
        counselor = counselor.name,
        logistics = session_logistics(kind, counselor),
    );

    EmailMessage {
        from: from.to_string(),
        to: notice.user_email.to_string(),
        subject: format!("Booking Confirmed - {} at {}", notice.short_date(), notice.time()),
        html,
        text: Some(text),
    }
}

pub fn counselor_alert(
    notice: &BookingNotice<'_>,
    counselor: &CounselorContact,
    from: &str,
) -> EmailMessage {
    let booking = notice.booking;
    let html = format!(
        "<!DOCTYPE html>\n<html><body>\n\
         <h2>New Booking Alert</h2>\n\
         <p>Dear {counselor},</p>\n\
         <p>A new session has been booked through MindMetric.</p>\n\
         <p><strong>Patient:</strong> {name}<br>\n\
         <strong>Email:</strong> {email}<br>\n\
         <strong>Phone:</strong> {phone}<br>\n\
         <strong>Date:</strong> {date}<br>\n\
         <strong>Time:</strong> {time}<br>\n\
         <strong>Type:</strong> {kind}<br>\n\
         <strong>Booking ID:</strong> #{id}</p>\n\
         {notes}\
         <p>Please prepare for the session and confirm your availability.</p>\n\
         </body></html>",
        counselor = encode_text(&counselor.name),
        name = encode_text(notice.user_name),
        email = encode_text(notice.user_email),
        phone = encode_text(&booking.phone_number),
        date = notice.long_date(),
        time = notice.time(),
        kind = booking.consultation_type.label(),
        id = booking.id.0,
        notes = booking
            .notes
            .as_deref()
            .filter(|notes| !notes.trim().is_empty())
            .map(|notes| format!("<p><strong>Notes:</strong> {}</p>\n", encode_text(notes)))
            .unwrap_or_default(),
    );

    EmailMessage {
        from: from.to_string(),
        to: counselor.email.clone(),
        subject: format!("New Booking Alert - {}", notice.short_date()),
        html,
        text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{counselor, sample_booking};

    #[test]
    fn video_sessions_mention_the_call_link() {
        let booking = sample_booking(ConsultationType::Video);
        let notice = BookingNotice {
            booking: &booking,
            user_name: "Ada",
            user_email: "ada@example.com",
        };

        let message = whatsapp_confirmation(&notice, &counselor());
        assert!(message.contains("Hello Ada!"));
        assert!(message.contains("video call link"));
        assert!(message.contains("November 02, 2026"));
        assert!(message.contains("02:30 PM"));
    }

    #[test]
    fn in_person_sessions_give_the_clinic_location() {
        let booking = sample_booking(ConsultationType::InPerson);
        let notice = BookingNotice {
            booking: &booking,
            user_name: "Ada",
            user_email: "ada@example.com",
        };

        let email = confirmation_email(&notice, &counselor(), "noreply@mindmetric.ai");
        assert_eq!(email.to, "ada@example.com");
        assert!(email.subject.starts_with("Booking Confirmed - November 02, 2026"));
        assert!(email.html.contains("Test Clinic, Springfield"));
        assert!(email
            .text
            .as_deref()
            .is_some_and(|text| text.contains("Location: Test Clinic, Springfield")));
    }

    #[test]
    fn counselor_alert_goes_to_the_counselor() {
        let booking = sample_booking(ConsultationType::Video);
        let notice = BookingNotice {
            booking: &booking,
            user_name: "Ada",
            user_email: "ada@example.com",
        };

        let alert = counselor_alert(&notice, &counselor(), "noreply@mindmetric.ai");
        assert_eq!(alert.to, "counselor@example.com");
        assert!(alert.html.contains("ada@example.com"));
        assert!(alert.html.contains(&format!("#{}", booking.id.0)));
        assert!(alert.text.is_none());
    }

    #[test]
    fn user_supplied_fields_are_escaped_in_html_bodies() {
        let mut booking = sample_booking(ConsultationType::Video);
        booking.notes = Some(r#"<a href="https://evil.example">verify account</a>"#.to_string());
        booking.phone_number = "<b>+1555</b>".to_string();
        let notice = BookingNotice {
            booking: &booking,
            user_name: "<script>x</script>",
            user_email: "ada@example.com",
        };

        let alert = counselor_alert(&notice, &counselor(), "noreply@mindmetric.ai");
        assert!(!alert.html.contains("<a href"));
        assert!(!alert.html.contains("<script>"));
        assert!(!alert.html.contains("<b>+1555"));
        assert!(alert
            .html
            .contains("&lt;a href=\"https://evil.example\"&gt;verify account&lt;/a&gt;"));
        assert!(alert.html.contains("&lt;script&gt;x&lt;/script&gt;"));

        let email = confirmation_email(&notice, &counselor(), "noreply@mindmetric.ai");
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("Dear &lt;script&gt;x&lt;/script&gt;,"));
        assert!(email
            .text
            .as_deref()
            .is_some_and(|text| text.contains("Dear <script>x</script>,")));
    }
}
