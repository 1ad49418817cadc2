/// Router Module Index
///
/// Routes are split by who may call them. Authentication is applied per
/// group: nothing on the public router, the auth middleware on the
/// authenticated router, and the `AuthUser` extractor plus role checks inside
/// every admin handler.

/// Anonymous, read-only site endpoints and the contact form.
pub mod public;

/// Routes requiring any valid session.
pub mod authenticated;

/// The CMS surface under `/admin`.
pub mod admin;
