use courtside::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    Login { email: String, password: String },
    Register { email: String, password: String },
    Logout,
    Players,
    Show,
    Add(PlayerId),
    Remove(PlayerId),
    Save,
    Discard,
    Refresh,
    Users,
    DeleteUser(UserId),
    ResetPassword(UserId),
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  login <email> <password>     log in
  register <email> <password>  create an account
  logout                       log out
  players                      list the player pool
  show                         show profile and working selection
  add <id> / remove <id>       edit the working selection
  save                         save the selection
  discard                      drop unsaved edits
  refresh                      re-read the profile
  users                        list accounts (admin)
  delete-user <id>             delete an account (admin)
  reset-password <id>          reset an account's password (admin)
  quit";

fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = words.collect();

    let credentials = |args: &[&str]| match args {
        [email, password] => Ok((email.to_string(), password.to_string())),
        _ => Err(format!("usage: {verb} <email> <password>")),
    };
    let player = |args: &[&str]| match args {
        [raw] => raw
            .trim_start_matches("P-")
            .parse()
            .map(PlayerId)
            .map_err(|_| format!("not a player id: {raw}")),
        _ => Err(format!("usage: {verb} <id>")),
    };
    let user = |args: &[&str]| match args {
        [raw] => raw
            .trim_start_matches("U-")
            .parse()
            .map(UserId)
            .map_err(|_| format!("not a user id: {raw}")),
        _ => Err(format!("usage: {verb} <id>")),
    };

    match verb {
        "login" => credentials(&args).map(|(email, password)| Command::Login { email, password }),
        "register" => {
            credentials(&args).map(|(email, password)| Command::Register { email, password })
        }
        "logout" => Ok(Command::Logout),
        "players" => Ok(Command::Players),
        "show" => Ok(Command::Show),
        "add" => player(&args).map(Command::Add),
        "remove" | "rm" => player(&args).map(Command::Remove),
        "save" => Ok(Command::Save),
        "discard" => Ok(Command::Discard),
        "refresh" => Ok(Command::Refresh),
        "users" => Ok(Command::Users),
        "delete-user" => user(&args).map(Command::DeleteUser),
        "reset-password" => user(&args).map(Command::ResetPassword),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

struct Cli {
    app: Courtside,
    catalog: PlayerCatalog<HttpApi, HttpApi>,
    editor: RosterEngine<HttpApi, HttpApi>,
}

impl Cli {
    fn new(app: Courtside) -> Self {
        let catalog = app.catalog();
        let editor = app.editor();
        Self {
            app,
            catalog,
            editor,
        }
    }

    /// Runs one command. Returns `false` when the user asked to quit.
    async fn run(&mut self, command: Command) -> Result<bool, CourtsideError> {
        match command {
            Command::Login { email, password } => {
                self.app.login(email, password).await?;
                self.editor = self.app.editor();
                self.catalog.load().await?;
                self.show();
            }
            Command::Register { email, password } => {
                self.app.register(email, password).await?;
                println!("registered; now `login`");
            }
            Command::Logout => {
                self.app.logout();
                println!("logged out");
            }
            Command::Players => {
                if self.catalog.is_empty() {
                    self.catalog.load().await?;
                }
                for player in self.catalog.players() {
                    let marker = if self.editor.contains(player.id) { '*' } else { ' ' };
                    println!(
                        "{marker} {:>4}  {:<28} {:<4} {:>6.1}",
                        player.id.0,
                        player.name,
                        player.position.as_deref().unwrap_or("-"),
                        player.average_score
                    );
                }
            }
            Command::Show => self.show(),
            Command::Add(id) => {
                if self.editor.add(id)? {
                    println!("added {id} ({} slots left)", self.editor.remaining());
                }
            }
            Command::Remove(id) => {
                if self.editor.remove(id)? {
                    println!("removed {id}");
                }
            }
            Command::Save => {
                let profile = self.editor.save().await?;
                println!(
                    "saved {} players, {:.1} points",
                    profile.roster.len(),
                    profile.total_score
                );
            }
            Command::Discard => {
                self.editor.discard()?;
                self.show();
            }
            Command::Refresh => {
                self.app.refresh_profile().await?;
                self.show();
            }
            Command::Users => {
                for user in self.app.admin().users().await? {
                    println!(
                        "{:>6}  {:<32} {:<6} {:>8.1}",
                        user.id.to_string(),
                        user.email,
                        user.role.to_string(),
                        user.total_score
                    );
                }
            }
            Command::DeleteUser(id) => {
                self.app.admin().delete_user(id).await?;
                println!("deleted {id}");
            }
            Command::ResetPassword(id) => {
                self.app.admin().reset_password(id).await?;
                println!("password of {id} reset");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn show(&self) {
        match self.app.current_profile() {
            Some(profile) => println!(
                "{} ({}): {} players, {:.1} points",
                profile.email,
                profile.role,
                profile.roster.len(),
                profile.total_score
            ),
            None => println!("not logged in"),
        }
        let selection = self.editor.selection();
        let ids: Vec<String> = selection.iter().map(|id| id.to_string()).collect();
        let dirty = if self.editor.is_dirty() { ", unsaved" } else { "" };
        println!(
            "editor [{}{dirty}]: {}/{} [{}]",
            self.editor.state(),
            selection.len(),
            MAX_ROSTER_SIZE,
            ids.join(" ")
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    courtside::init_tracing();

    let app = CourtsideBuilder::from_env()?.build()?;
    let mut cli = Cli::new(app);
    eprintln!("courtside roster cli; type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        match cli.run(command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.needs_login() => eprintln!("{e}; please `login`"),
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
