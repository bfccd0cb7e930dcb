use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Source of the current time for components that display it.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midnight UTC on January 1st of `year`.
    pub fn from_year(year: i32) -> Option<FixedClock> {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn header() -> String {
    String::from(r#"<header class="header"><div class="header-logo">Wipro</div></header>"#)
}

pub fn main() -> String {
    String::from(concat!(
        r#"<main class="main">"#,
        "<h1>Developer Portal wipro</h1>",
        r#"<p style="font-size:19px">Welcome to the Developer Portal</p>"#,
        "</main>"
    ))
}

pub fn footer(clock: &impl Clock) -> String {
    format!(
        r#"<footer class="footer"><p style="font-size:12px">&copy; {} Wipro. All rights reserved.</p></footer>"#,
        clock.now().year()
    )
}

pub fn app(clock: &impl Clock) -> String {
    format!(
        r#"<div class="App">{}{}{}</div>"#,
        header(),
        main(),
        footer(clock)
    )
}

/// The whole page, with the app mounted in the `root` element.
pub fn document(clock: &impl Clock) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Developer Portal</title>\n\
         </head>\n\
         <body>\n\
         <div id=\"root\">{}</div>\n\
         </body>\n\
         </html>\n",
        app(clock)
    )
}
