pub mod application;
pub mod company;
pub mod question;
pub mod tip;
pub mod user;

pub use application::{Application, ApplicationView, SavedApplication};
pub use company::Company;
pub use question::{Difficulty, InterviewQuestion, InterviewQuestionView, LeetcodeQuestion};
pub use tip::{Tip, TipView};
pub use user::{AlumniProfile, RoleProfile, StudentProfile, User, UserView};
