//! Script header parsing.
//!
//! A script declares what it needs in the comments and declaration lines that
//! precede its first line of code:
//!
//! ```javascript
//! /*
//!  * Admin panel
//!  * using jquery-{version}
//!  * using widgets/grid nocombine
//!  */
//! using-options nocombine;
//!
//! (function () { /* ... */ })();
//! ```
//!
//! - [`patterns`] classifies single lines (the Line Classifier)
//! - [`declaration`] turns declaration lines into [`DependencyReference`]s and
//!   [`OptionsRecord`]s (the Declaration Parser)
//! - [`extractor`] runs the comment-state machine over a whole file (the Header
//!   Extractor) and exposes [`parse_header`]

pub mod declaration;
pub mod extractor;
pub mod patterns;

pub use declaration::{Declaration, DeclarationError, DependencyReference, OptionsRecord};
pub use extractor::{Header, HeaderExtractor, MalformedLine, parse_header};
pub use patterns::{LineKind, LinePatterns, classify};
