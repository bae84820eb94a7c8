pub mod keywords;
pub mod normalize;
pub mod stopwords;

pub use keywords::extract_keywords;
pub use normalize::{comparable_text, normalize};
pub use stopwords::is_stop_word;
