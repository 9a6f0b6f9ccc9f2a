use askama::Template;
use serde::Deserialize;

use crate::email::Email;

/// A message from the contact page.
#[derive(Deserialize, Template)]
#[template(path = "contact_email.html")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl Email for ContactSubmission {
    fn subject(&self) -> String {
        match &self.subject {
            Some(subject) => format!("Website contact: {subject}"),
            None => format!("Website contact from {}", self.name),
        }
    }
}

/// A membership application from the get-involved page.
#[derive(Deserialize, Template)]
#[template(path = "membership_email.html")]
pub struct MembershipApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub occupation: Option<String>,
    pub city: Option<String>,
    pub motivation: String,
}

impl Email for MembershipApplication {
    fn subject(&self) -> String {
        format!("Membership application from {}", self.name)
    }
}

/// A scholarship application from the programs page.
#[derive(Deserialize, Template)]
#[template(path = "scholarship_email.html")]
pub struct ScholarshipApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub institution: String,
    pub course: Option<String>,
    pub statement: String,
}

impl Email for ScholarshipApplication {
    fn subject(&self) -> String {
        format!("Scholarship application from {}", self.name)
    }
}
