use std::io::{BufRead, Write};

use anyhow::Context;
use instafood_client::{
    api::{AuthToken, Backend, CommentId, Credentials, RecipeId},
    categories, render_text, CommentNode, CommentThread, HttpBackend, RecipeFilter, RecipeSearch,
    ThreadError,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(
        short,
        long,
        env = "INSTAFOOD_API_HOST",
        default_value = "http://localhost:5000"
    )]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Log in and print the session token, to be set as INSTAFOOD_TOKEN
    Login { email: String, password: String },

    /// Show the comments of a recipe
    Comments { recipe: String },

    /// Comment on a recipe
    Comment {
        recipe: String,
        text: String,

        /// Id of the comment to reply to
        #[structopt(long)]
        reply_to: Option<String>,
    },

    /// Like a comment, or remove the like if it was already there
    Like { recipe: String, comment: String },

    /// List the users who liked a recipe
    Likers { recipe: String },

    /// Delete one of your comments
    Delete {
        recipe: String,
        comment: String,

        /// Do not ask for confirmation
        #[structopt(long)]
        yes: bool,
    },

    /// List recipes, optionally filtered
    Recipes {
        #[structopt(long, conflicts_with_all = &["category", "difficulty"])]
        tag: Option<String>,

        #[structopt(long, conflicts_with = "difficulty")]
        category: Option<String>,

        #[structopt(long)]
        difficulty: Option<String>,

        /// Only keep results in this exact category
        #[structopt(long)]
        narrow: Option<String>,

        /// Text to look for in titles, descriptions and tags
        query: Option<String>,
    },
}

fn token() -> anyhow::Result<AuthToken> {
    let tok =
        std::env::var("INSTAFOOD_TOKEN").context("retrieving INSTAFOOD_TOKEN environment variable")?;
    Ok(AuthToken(tok))
}

fn confirm(node: &CommentNode) -> bool {
    print!("Delete comment {:?}? [y/N] ", node.text);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

/// A change that was saved but could not be shown is not an error
fn saved<T>(res: Result<T, ThreadError>, doing: &'static str) -> anyhow::Result<Option<T>> {
    match res {
        Err(ThreadError::RefreshFailed(err)) => {
            eprintln!("{doing} succeeded, but fetching the comments again failed: {err}");
            Ok(None)
        }
        res => res.map(Some).context(doing),
    }
}

fn print_thread(thread: &CommentThread) {
    print!("{}", render_text(thread.forest()));
    println!(
        "{} comments, {} at top level",
        thread.total_count(),
        thread.top_level_count()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout only carries command output, so that it can be captured
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let opt = <Opt as structopt::StructOpt>::from_args();
    let backend = HttpBackend::new(reqwest::Client::new(), opt.host);

    match opt.cmd {
        Command::Login { email, password } => {
            let resp = backend
                .login(&Credentials { email, password })
                .await
                .context("logging in")?;
            tracing::info!(user = ?resp.user_id, "logged in as {}", resp.full_name);
            println!("{}", resp.token.0);
        }
        Command::Comments { recipe } => {
            let mut thread = CommentThread::new(RecipeId(recipe));
            thread.refresh(&backend).await.context("fetching comments")?;
            print_thread(&thread);
        }
        Command::Comment {
            recipe,
            text,
            reply_to,
        } => {
            let token = token()?;
            let mut thread = CommentThread::new(RecipeId(recipe));
            thread.set_draft(text);
            thread.reply_to(reply_to.map(CommentId));
            let res = thread.add_comment(&backend, Some(&token)).await;
            if saved(res, "posting comment")?.is_some() {
                print_thread(&thread);
            }
        }
        Command::Like { recipe, comment } => {
            let token = token()?;
            let mut thread = CommentThread::new(RecipeId(recipe));
            let res = thread
                .like_comment(&backend, Some(&token), &CommentId(comment))
                .await;
            if let Some(status) = saved(res, "toggling like")? {
                println!("{}", if status.liked { "Liked" } else { "Unliked" });
                print_thread(&thread);
            }
        }
        Command::Delete {
            recipe,
            comment,
            yes,
        } => {
            let token = token()?;
            let mut thread = CommentThread::new(RecipeId(recipe));
            // the comment must be known locally before it can be deleted
            thread.refresh(&backend).await.context("fetching comments")?;
            let res = thread
                .delete_comment(&backend, Some(&token), &CommentId(comment), |n| {
                    yes || confirm(n)
                })
                .await;
            if saved(res, "deleting comment")?.is_some() {
                print_thread(&thread);
            }
        }
        Command::Likers { recipe } => {
            let likers = backend
                .recipe_likers(&RecipeId(recipe))
                .await
                .context("fetching likers")?;
            if likers.users.is_empty() {
                println!("No likes yet.");
            }
            for name in likers.users {
                println!("{name}");
            }
        }
        Command::Recipes {
            tag,
            category,
            difficulty,
            narrow,
            query,
        } => {
            let filter = match (tag, category, difficulty) {
                (Some(t), _, _) => RecipeFilter::Tag(t),
                (_, Some(c), _) => RecipeFilter::Category(c),
                (_, _, Some(d)) => RecipeFilter::Difficulty(d),
                _ => RecipeFilter::Text(query.unwrap_or_default()),
            };
            let recipes = backend.list_recipes().await.context("fetching recipes")?;
            let mut search = RecipeSearch::new(filter);
            let found = search.run(&recipes);
            let facets = categories(found.iter().copied());
            search.category = narrow;
            for r in search.run(&recipes) {
                println!(
                    "{}  {}  [{}] {}",
                    r.id.0,
                    r.title,
                    r.category.as_deref().unwrap_or("-"),
                    r.tags.join(", ")
                );
            }
            if !facets.is_empty() {
                println!("categories: {}", facets.join(", "));
            }
        }
    }

    Ok(())
}
