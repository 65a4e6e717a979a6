use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Welcome and feature overview")]
    Start,
    #[command(description = "Random hadith, search (/hadith sabr) or lookup (/hadith 2:13)")]
    Hadith(String),
    #[command(description = "Save the last shown hadith")]
    Fav,
    #[command(description = "List favourites")]
    Favorites,
    #[command(description = "Remove favourite: /unfav 1")]
    Unfav(String),
    #[command(description = "Set daily hadith time: /daily 08:30")]
    Daily(String),
    #[command(description = "Disable the daily hadith")]
    DailyOff,
    #[command(description = "Add reminder: /remind 08:30 [label]")]
    Remind(String),
    #[command(description = "List reminders")]
    Reminders,
    #[command(description = "Delete reminder: /delremind 1 or all")]
    DelRemind(String),
    #[command(description = "Bookmark a verse: /bookmark 2:255")]
    Bookmark(String),
    #[command(description = "List bookmarks")]
    Bookmarks,
    #[command(description = "Remove bookmark: /unbookmark 2:255")]
    Unbookmark(String),
    #[command(description = "Reading streak")]
    Streak,
    #[command(description = "Reading progress")]
    Progress,
    #[command(description = "Change language")]
    Lang,
    #[command(description = "Show help message")]
    Help,
}
