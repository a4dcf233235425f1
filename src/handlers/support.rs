use serde::Serialize;
use utoipa::ToSchema;

use axum::Json;

use crate::{auth::Viewer, handlers::common::Page, ApiResponse, ApiResult};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupportChannel {
    pub name: &'static str,
    pub detail: &'static str,
    pub availability: &'static str,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupportPage {
    pub channels: Vec<SupportChannel>,
    pub faq: Vec<FaqEntry>,
}

fn support_page() -> SupportPage {
    SupportPage {
        channels: vec![
            SupportChannel {
                name: "Email",
                detail: "support@yourcompany.com",
                availability: "Replies within one business day",
            },
            SupportChannel {
                name: "Phone",
                detail: "+1 (555) 123-4567",
                availability: "Mon-Fri, 9am-6pm",
            },
            SupportChannel {
                name: "Live chat",
                detail: "Available from the portal",
                availability: "Business hours",
            },
        ],
        faq: vec![
            FaqEntry {
                question: "How do I track my order?",
                answer: "Open Track Shipments to see carrier, tracking number and delivery status.",
            },
            FaqEntry {
                question: "Can I personalize an item after ordering?",
                answer: "Yes. While the line is still pending, file a request under Personalize Orders.",
            },
            FaqEntry {
                question: "Which payment methods are accepted?",
                answer: "Razorpay, UPI, NEFT bank transfer and cheque.",
            },
            FaqEntry {
                question: "Where are my invoices?",
                answer: "Invoices for your account are listed under Billing, with due dates and status.",
            },
        ],
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/support",
    responses((status = 200, description = "Help channels and FAQ", body = ApiResponse<Page<SupportPage>>)),
    security(("Bearer" = [])),
    tag = "support"
)]
pub async fn support(viewer: Viewer) -> ApiResult<Page<SupportPage>> {
    Ok(Json(ApiResponse::success(Page::new(&viewer, &[], support_page()))))
}
