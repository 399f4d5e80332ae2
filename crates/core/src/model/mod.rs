mod ids;
mod question;
mod question_set;

pub use ids::{ParseIdError, QuestionId, QuestionSetId};
pub use question::{Question, QuestionError};
pub use question_set::{QuestionSet, QuestionSetError};
