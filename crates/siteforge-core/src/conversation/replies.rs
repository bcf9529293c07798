//! Outbound reply texts.
//!
//! Every user-visible message the state machine can send lives here, so the
//! scenario tests can assert on exact strings and the texts stay consistent
//! across transitions.

use siteforge_types::project::Project;

pub const WELCOME: &str = "Welcome! 👋 I can help you build a website in minutes.\n\
Let's start your first project. What would you like to name it?";

pub const MENU: &str = "What would you like to do?\n\
1. Start a new project\n\
2. Resume an existing project\n\
Reply with 1 or 2.";

pub const PROJECT_CREATED: &str = "Your project is created! \
Tell me about the website you want and I'll build it for you.";

pub const ASK_PROJECT_NAME: &str = "Great! What would you like to name your new project?";

pub const NO_PROJECTS: &str = "You don't have any projects yet. Reply 1 to start a new one.";

pub const INVALID_OPTION: &str =
    "That's not an option I know. Reply 1 to start a new project or 2 to resume one.";

pub const INVALID_SELECTION: &str =
    "That number isn't on the list. Pick one of the listed projects.";

pub const REPLY_WITH_NUMBER: &str =
    "Please reply with the number of the project you want to resume.";

pub const PROJECT_NOT_FOUND: &str =
    "I couldn't find that project anymore. Let's pick something else.";

pub const WORKING: &str = "Got it! Building your website now, this can take a minute.";

pub const TRY_AGAIN: &str = "Something went wrong while building your site. Please try again.";

/// Confirmation sent when the user resumes an existing project.
pub fn resuming(name: &str) -> String {
    format!("Resuming '{name}'. Tell me what to build or change next.")
}

/// Terminal notice for a successful generation turn.
pub fn site_live(url: &str) -> String {
    format!("Your website is live! 🎉\n{url}")
}

/// Numbered project list, in the order the caller supplies (most recent
/// first). Selection replies are matched against these 1-based indices.
pub fn project_list(projects: &[Project]) -> String {
    let mut text = String::from("Your projects:\n");
    for (index, project) in projects.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", index + 1, project.name));
    }
    text.push_str("Reply with the number of the project to resume.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteforge_types::user::UserId;

    #[test]
    fn test_project_list_is_one_based() {
        let user_id = UserId::new();
        let projects = vec![
            Project::new(user_id.clone(), "Newest"),
            Project::new(user_id, "Older"),
        ];

        let text = project_list(&projects);
        assert!(text.contains("1. Newest"));
        assert!(text.contains("2. Older"));
    }
}
