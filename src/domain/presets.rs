//! Built-in schemas for the two application forms the show runs.
//!
//! Both are plain [`FormSchema`] values; nothing downstream knows which one
//! it is handling.

use super::schema::{Choice, FieldKind, FieldSchema, FormSchema, IssueKind};

pub const SHOW_NAMESPACE: &str = "ceo-reality-show";

const NIGERIAN_STATES: &[&str] = &[
    "Abia",
    "Adamawa",
    "Akwa Ibom",
    "Anambra",
    "Bauchi",
    "Bayelsa",
    "Benue",
    "Borno",
    "Cross River",
    "Delta",
    "Ebonyi",
    "Edo",
    "Ekiti",
    "Enugu",
    "FCT",
    "Gombe",
    "Imo",
    "Jigawa",
    "Kaduna",
    "Kano",
    "Katsina",
    "Kebbi",
    "Kogi",
    "Kwara",
    "Lagos",
    "Nasarawa",
    "Niger",
    "Ogun",
    "Ondo",
    "Osun",
    "Oyo",
    "Plateau",
    "Rivers",
    "Sokoto",
    "Taraba",
    "Yobe",
    "Zamfara",
];

const DIAL_CODES: &[(&str, &str)] = &[
    ("+1", "USA (+1)"),
    ("+55", "Brazil (+55)"),
    ("+234", "Nigeria (+234)"),
    ("+44", "United Kingdom (+44)"),
    ("+27", "South Africa (+27)"),
    ("+233", "Ghana (+233)"),
    ("+254", "Kenya (+254)"),
    ("+256", "Uganda (+256)"),
    ("+255", "Tanzania (+255)"),
    ("+250", "Rwanda (+250)"),
    ("+237", "Cameroon (+237)"),
    ("+225", "Côte d'Ivoire (+225)"),
    ("+221", "Senegal (+221)"),
    ("+212", "Morocco (+212)"),
    ("+20", "Egypt (+20)"),
    ("+213", "Algeria (+213)"),
    ("+33", "France (+33)"),
    ("+49", "Germany (+49)"),
    ("+39", "Italy (+39)"),
    ("+34", "Spain (+34)"),
    ("+31", "Netherlands (+31)"),
    ("+32", "Belgium (+32)"),
    ("+41", "Switzerland (+41)"),
    ("+43", "Austria (+43)"),
    ("+46", "Sweden (+46)"),
    ("+47", "Norway (+47)"),
    ("+45", "Denmark (+45)"),
    ("+358", "Finland (+358)"),
    ("+351", "Portugal (+351)"),
    ("+353", "Ireland (+353)"),
    ("+61", "Australia (+61)"),
    ("+64", "New Zealand (+64)"),
    ("+91", "India (+91)"),
    ("+86", "China (+86)"),
    ("+81", "Japan (+81)"),
    ("+82", "Korea South (+82)"),
    ("+65", "Singapore (+65)"),
    ("+60", "Malaysia (+60)"),
    ("+62", "Indonesia (+62)"),
    ("+66", "Thailand (+66)"),
    ("+84", "Vietnam (+84)"),
    ("+971", "United Arab Emirates (+971)"),
    ("+966", "Saudi Arabia (+966)"),
    ("+974", "Qatar (+974)"),
    ("+965", "Kuwait (+965)"),
    ("+973", "Bahrain (+973)"),
    ("+968", "Oman (+968)"),
    ("+52", "Mexico (+52)"),
    ("+54", "Argentina (+54)"),
    ("+56", "Chile (+56)"),
    ("+57", "Colombia (+57)"),
    ("+51", "Peru (+51)"),
];

const SHORT_REFERRALS: &[&str] = &[
    "Social Media",
    "Email / Newsletter",
    "TV / Radio",
    "Friend / Family / Colleague",
    "Stephen Akintayo Event / Training",
    "Online Advertisement",
    "Other",
];

const LONG_REFERRALS: &[(&str, &str)] = &[
    ("social", "Social Media (Instagram, Facebook, TikTok, X)"),
    ("email", "Email / Newsletter"),
    ("tv", "TV / Radio"),
    ("friend", "Friend / Family / Colleague"),
    ("event", "Event / Training"),
    ("other", "Other"),
];

/// Which built-in schema to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    Short,
    #[default]
    Long,
}

impl Variant {
    pub fn schema(self) -> FormSchema {
        match self {
            Variant::Short => short_form(),
            Variant::Long => long_form(),
        }
    }
}

fn email_field() -> FieldSchema {
    FieldSchema::new("email", "Email Address", FieldKind::Email)
        .with_message(IssueKind::InvalidEmail, "Please enter a valid email address.")
}

fn phone_field(min: usize) -> FieldSchema {
    FieldSchema::new("phone", "Phone Number (WhatsApp Preferred)", FieldKind::Phone)
        .min_length(min)
        .with_message(IssueKind::InvalidPhone, "Please enter a valid phone number.")
}

/// Applicant profile without media upload.
pub fn short_form() -> FormSchema {
    FormSchema {
        id: SHOW_NAMESPACE.to_string(),
        title: "KeystoDCity Reality Show Registration".to_string(),
        description: Some("All fields marked with an asterisk (*) are required.".to_string()),
        fields: vec![
            email_field(),
            FieldSchema::new("name", "Name", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please enter your name."),
            FieldSchema::new(
                "phonePrefix",
                "Country Code",
                FieldKind::Enum {
                    options: DIAL_CODES
                        .iter()
                        .map(|(code, label)| Choice::labelled(*code, *label))
                        .collect(),
                },
            )
            .with_message(IssueKind::InvalidChoice, "Please select a country code."),
            phone_field(7),
            FieldSchema::new("country", "Country", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please enter your country."),
            FieldSchema::new("organisation", "Organisation", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please enter your organisation."),
            FieldSchema::new("jobRole", "Job Role", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please enter your job role."),
            FieldSchema::new("state", "State", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please enter your state."),
            FieldSchema::new("age", "Age", FieldKind::Number)
                .range(18, 100)
                .with_message(IssueKind::OutOfRange, "You must be between 18 and 100 years old."),
            FieldSchema::new(
                "referral",
                "How did you hear about this show?",
                FieldKind::choices(SHORT_REFERRALS.iter().copied()),
            )
            .with_message(
                IssueKind::InvalidChoice,
                "Please select how you heard about this show.",
            ),
            FieldSchema::new(
                "professionalStatus",
                "Professional Status",
                FieldKind::choices(["Employee", "Employer"]),
            )
            .with_message(
                IssueKind::InvalidChoice,
                "Please select your professional status.",
            ),
            FieldSchema::new("socialMedia", "Social Media Link", FieldKind::Url).optional(),
        ],
    }
}

/// Full application including the one-minute video.
pub fn long_form() -> FormSchema {
    FormSchema {
        id: SHOW_NAMESPACE.to_string(),
        title: "Apply Now to Join KeystoDCity Reality Show".to_string(),
        description: Some(
            "Share clearly who you are, what you've done and why you should be considered."
                .to_string(),
        ),
        fields: vec![
            FieldSchema::new("firstName", "First Name", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please enter your first name."),
            FieldSchema::new("lastName", "Last Name", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please enter your last name."),
            email_field(),
            phone_field(10),
            FieldSchema::new(
                "state",
                "State in Nigeria",
                FieldKind::choices(NIGERIAN_STATES.iter().copied()),
            )
            .with_message(IssueKind::InvalidChoice, "Please select your state in Nigeria."),
            FieldSchema::new("age", "Age", FieldKind::Number)
                .range(21, 70)
                .with_message(
                    IssueKind::OutOfRange,
                    "You must be between 21 and 70 years old to apply.",
                ),
            FieldSchema::new("occupation", "Current Occupation / Role", FieldKind::Text)
                .min_length(2)
                .with_message(IssueKind::TooShort, "Please tell us your current occupation."),
            FieldSchema::new("experience", "Experience", FieldKind::Text)
                .min_length(20)
                .transient()
                .with_message(
                    IssueKind::TooShort,
                    "Please share at least a few lines about your experience.",
                ),
            FieldSchema::new("whyYou", "Why You?", FieldKind::Text)
                .min_length(20)
                .transient()
                .with_message(IssueKind::TooShort, "This field is required."),
            FieldSchema::new("socials", "Link to your social media / website", FieldKind::Url)
                .with_help("This helps us understand your personal brand, work and background better.")
                .with_message(IssueKind::InvalidUrl, "Please enter a valid URL."),
            FieldSchema::new("video", "Upload 1-Minute Video", FieldKind::video()).with_help(
                "Your video must be exactly 1 minute (60 seconds). Longer videos will not be accepted.",
            ),
            FieldSchema::new(
                "referral",
                "How did you hear about KeystoDCity Reality Show?",
                FieldKind::Enum {
                    options: LONG_REFERRALS
                        .iter()
                        .map(|(value, label)| Choice::labelled(*value, *label))
                        .collect(),
                },
            )
            .with_message(IssueKind::InvalidChoice, "Please select an option."),
            FieldSchema::new("consent", "Availability & Consent", FieldKind::Boolean)
                .transient()
                .with_help(
                    "I confirm that the information provided is accurate and that I'm available to participate fully if selected.",
                )
                .with_message(
                    IssueKind::ConsentRequired,
                    "You must confirm this before submitting.",
                ),
        ],
    }
}
