pub mod aliases;
pub mod dispatcher;
pub mod facts;
pub mod fetcher;
pub mod fuzzy;
mod models;
pub mod normalize;
pub mod page;
mod resolver_error;
pub mod url_guesser;

pub use aliases::AliasResolver;
pub use dispatcher::{Dispatcher, ListingSite};
pub use fetcher::{HttpPageSource, PageSource};
pub use fuzzy::{FuzzyMatcher, OverlapBasis};
pub use resolver_error::ResolveError;
