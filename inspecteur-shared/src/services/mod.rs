/// Outbound provider services
///
/// Each service is an explicitly constructed object handed to the request
/// handlers through application state; there are no module-level
/// singletons. A service whose configuration is absent constructs as a *disabled*
/// variant that degrades gracefully instead of crashing at startup:
/// disabled email is a no-op, disabled chat returns the fallback reply,
/// disabled payments answer with a service error.
///
/// # Modules
///
/// - [`email`]: SMTP notifications (welcome, purchase, certificate)
/// - [`chat`]: AI course-assistant wrapper with a canned fallback
/// - [`stripe`]: checkout sessions and webhook signature verification
/// - [`certificate`]: completion-certificate rendering (SVG data URI)

pub mod certificate;
pub mod chat;
pub mod email;
pub mod stripe;
