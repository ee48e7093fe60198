//! Turns opaque failures into an actionable report.
//!
//! Rules are tried in order against the lower-cased message and the first hit
//! wins. Categories share vocabulary ("limit", "key"), so the order matters.

use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ContentSafety,
    RateLimit,
    PermissionDenied,
    ServiceUnavailable,
    InvalidRequest,
    NoOutput,
    Network,
    Unexpected,
}

impl ErrorCategory {
    pub fn title(self) -> &'static str {
        match self {
            Self::ContentSafety => "CONTENT SAFETY VIOLATION",
            Self::RateLimit => "RATE LIMIT EXCEEDED",
            Self::PermissionDenied => "PERMISSION DENIED",
            Self::ServiceUnavailable => "SERVICE UNAVAILABLE",
            Self::InvalidRequest => "INVALID REQUEST PARAMETERS",
            Self::NoOutput => "GENERATION PRODUCED NO OUTPUT",
            Self::Network => "NETWORK CONNECTION ERROR",
            Self::Unexpected => "UNEXPECTED ERROR",
        }
    }

    /// Status used when the report is returned over HTTP.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::ContentSafety => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::PermissionDenied | Self::NoOutput | Self::Network => StatusCode::BAD_GATEWAY,
            Self::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn steps(self) -> &'static [&'static str] {
        match self {
            Self::ContentSafety => &[
                "The AI model detected sensitive content in the prompt or image.",
                "Modify the description to be more neutral or professional.",
                "Ensure the product URL does not link to restricted categories (e.g., medical, weapons, adult).",
                "Avoid mentioning real people or copyrighted characters.",
            ],
            Self::RateLimit => &[
                "You have hit the maximum number of requests allowed.",
                "Please pause for 60 seconds to let the quota reset.",
                "If you are on a free tier, these limits are lower.",
                "Consider upgrading your Google Cloud project quota if frequent.",
            ],
            Self::PermissionDenied => &[
                "The API Key is missing, invalid, or expired.",
                "Verify the API Key is correctly set in your environment variables.",
                "Ensure the Google Cloud project has the \"Generative Language API\" enabled.",
                "Check if your project has billing enabled (required for some models).",
            ],
            Self::ServiceUnavailable => &[
                "Google's AI servers are currently experiencing high traffic.",
                "This is a temporary issue on the provider side.",
                "Please wait a few minutes and try again.",
                "Check the Google Cloud Service Health Dashboard.",
            ],
            Self::InvalidRequest => &[
                "Check if the Product URL is publicly accessible and free of typos.",
                "Ensure the URL protocol is correct (http:// or https://).",
                "The prompt might be too complex or contain unsupported characters.",
                "Try removing the Product URL to see if that resolves the issue.",
            ],
            Self::NoOutput => &[
                "The model accepted the prompt but returned an empty response.",
                "This often happens if the Product URL content cannot be read.",
                "Try slightly rewording your description.",
                "Try generating without the Product URL to isolate the issue.",
            ],
            Self::Network => &[
                "Unable to connect to Google API servers.",
                "Check your internet connection.",
                "Disable ad-blockers, VPNs, or firewalls that might block API calls.",
                "Ensure you are not offline.",
            ],
            Self::Unexpected => &[
                "Try simplifying your prompt.",
                "Check your internet connection.",
                "Refresh the page and try again.",
            ],
        }
    }
}

const RULES: &[(ErrorCategory, &[&str])] = &[
    (ErrorCategory::ContentSafety, &["safety", "blocked", "harmful", "prohibited"]),
    (ErrorCategory::RateLimit, &["429", "quota", "limit", "resource exhausted", "resource_exhausted"]),
    (ErrorCategory::PermissionDenied, &["403", "permission", "key", "authorized"]),
    (ErrorCategory::ServiceUnavailable, &["503", "500", "internal", "unavailable", "overloaded"]),
    (ErrorCategory::InvalidRequest, &["400", "invalid argument", "invalid_argument", "bad request"]),
    (ErrorCategory::NoOutput, &["no image data found"]),
    (ErrorCategory::Network, &["fetch failed", "network", "failed to fetch"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub category: ErrorCategory,
    pub title: String,
    pub steps: Vec<String>,
}

pub fn classify(error: &dyn std::error::Error) -> ErrorReport {
    classify_message(&error.to_string())
}

pub fn classify_message(message: &str) -> ErrorReport {
    let message = message.to_lowercase();
    let category = RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| message.contains(n)))
        .map(|(category, _)| *category)
        .unwrap_or(ErrorCategory::Unexpected);

    let mut steps: Vec<String> = Vec::with_capacity(4);
    if category == ErrorCategory::Unexpected {
        steps.push(format!("System Message: {message}"));
    }
    steps.extend(category.steps().iter().map(|s| s.to_string()));

    ErrorReport { category, title: category.title().to_string(), steps }
}
