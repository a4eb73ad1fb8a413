mod app;
pub use app::{App, AppContext, AppMsg};

mod comment_section;
pub use comment_section::CommentSection;

mod confirm_dialog;
pub use confirm_dialog::ConfirmDialog;

mod likers_dialog;
pub use likers_dialog::LikersDialog;

mod login;
pub use login::Login;

mod navbar;
pub use navbar::Navbar;

mod recipe_card;
pub use recipe_card::RecipeCard;

mod recipe_feed;
pub use recipe_feed::RecipeFeed;

mod search_bar;
pub use search_bar::SearchBar;

mod snackbar;
pub use snackbar::Snackbar;
