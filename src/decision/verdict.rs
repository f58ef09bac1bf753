//! Terminal verdict values.

use serde_json::Value;

/// Body carried by a verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum VerdictBody {
    Json(Value),
    Html(String),
    Empty,
}

/// Kind of body, used to pick the content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Html,
    Empty,
}

impl BodyKind {
    pub fn content_type(self) -> &'static str {
        match self {
            BodyKind::Json => "application/json",
            BodyKind::Html => "text/html; charset=utf-8",
            BodyKind::Empty => "text/plain; charset=utf-8",
        }
    }
}

/// The HTTP decision for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeVerdict {
    pub status: u16,
    pub body: VerdictBody,
}

impl EdgeVerdict {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: VerdictBody::Json(body),
        }
    }

    pub fn html(status: u16, page: impl Into<String>) -> Self {
        Self {
            status,
            body: VerdictBody::Html(page.into()),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: VerdictBody::Empty,
        }
    }

    pub fn body_kind(&self) -> BodyKind {
        match self.body {
            VerdictBody::Json(_) => BodyKind::Json,
            VerdictBody::Html(_) => BodyKind::Html,
            VerdictBody::Empty => BodyKind::Empty,
        }
    }

}

/// What the gate does with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Answer at the edge.
    Respond(EdgeVerdict),
    /// Let the request continue to the origin unchanged.
    PassThrough,
}
