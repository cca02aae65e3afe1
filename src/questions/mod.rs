pub mod model;
pub mod repository;

pub use model::{Question, SUBJECTS};
pub use repository::QuestionRepository;
