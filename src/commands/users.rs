use tabled::Tabled;

use taskboard::error::Result;
use taskboard::types::User;
use taskboard::TrackerApi;

use crate::output::print_table;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Issues")]
    tasks_count: i64,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.full_name.clone(),
            email: user.email.clone(),
            team: if user.team_name.is_empty() {
                "-".to_string()
            } else {
                user.team_name.clone()
            },
            tasks_count: user.tasks_count,
        }
    }
}

pub async fn list(api: &dyn TrackerApi) -> Result<()> {
    let users = api.list_users().await?;
    print_table(&users, |u| UserRow::from(u));
    Ok(())
}
