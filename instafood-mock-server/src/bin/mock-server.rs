use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use instafood_api::{CommentId, RecipeId, UserId};
use instafood_mock_server::MockServer;
use rand::{seq::SliceRandom, Rng};

const CATEGORIES: &[&str] = &["Breakfast", "Main", "Dessert", "Starter", "Drinks"];
const DIFFICULTIES: &[&str] = &["Easy", "Medium", "Hard"];
const TAGS: &[&str] = &[
    "vegan", "quick", "baking", "spicy", "citrus", "chocolate", "comfort", "grill",
];

const COMMENT_WORD_COUNT: usize = 12;
const RECIPE_TITLE_WORD_COUNT: usize = 3;
const RECIPE_DESCRIPTION_WORD_COUNT: usize = 25;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:5000")]
    addr: SocketAddr,

    /// Number of users to create, each with password "password"
    #[structopt(long, default_value = "3")]
    users: usize,

    #[structopt(long, default_value = "10")]
    recipes: usize,

    #[structopt(long, default_value = "40")]
    comments_per_recipe: usize,

    /// Probability that a generated comment replies to an earlier one
    #[structopt(long, default_value = "0.6")]
    reply_ratio: f64,
}

fn seed(opt: &Opt) -> anyhow::Result<MockServer> {
    let mut rng = rand::thread_rng();
    let mut server = MockServer::new();

    let users = (0..opt.users)
        .map(|i| {
            let name = format!("{}{i}", lipsum::lipsum_words(1).to_lowercase());
            let email = format!("user{i}@example.org");
            server.create_user(&email, &name, "password")
        })
        .collect::<Vec<UserId>>();
    let gen_user = |rng: &mut rand::rngs::ThreadRng| users.choose(rng).cloned();

    for _ in 0..opt.recipes {
        let author = match gen_user(&mut rng) {
            Some(u) => u,
            None => break,
        };
        let title = lipsum::lipsum_words(RECIPE_TITLE_WORD_COUNT);
        let recipe: RecipeId = server.create_recipe(&author, &title);
        if let Some(r) = server.recipe_mut(&recipe) {
            r.description = lipsum::lipsum(RECIPE_DESCRIPTION_WORD_COUNT);
            r.category = CATEGORIES.choose(&mut rng).map(|c| String::from(*c));
            r.difficulty = DIFFICULTIES.choose(&mut rng).map(|d| String::from(*d));
            let num_tags = rng.gen_range(0..4);
            r.tags = TAGS
                .choose_multiple(&mut rng, num_tags)
                .map(|t| String::from(*t))
                .collect();
            r.ingredients = (0..rng.gen_range(2..8))
                .map(|_| lipsum::lipsum_words(rng.gen_range(1..3)))
                .collect();
        }
        for user in &users {
            if rng.gen_bool(0.5) {
                server.set_recipe_liked(&recipe, user, true)?;
            }
        }

        let mut comments: Vec<CommentId> = Vec::new();
        for _ in 0..opt.comments_per_recipe {
            let author = match gen_user(&mut rng) {
                Some(u) => u,
                None => break,
            };
            let parent = match rng.gen_bool(opt.reply_ratio.clamp(0.0, 1.0)) {
                true => comments.choose(&mut rng).cloned(),
                false => None,
            };
            let text = lipsum::lipsum_words(rng.gen_range(1..=COMMENT_WORD_COUNT));
            comments.push(server.add_comment(&recipe, &author, &text, parent.as_ref()));
        }
    }

    Ok(server)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let server = seed(&opt).context("seeding mock server")?;
    tracing::info!(
        users = opt.users,
        recipes = opt.recipes,
        "seeded mock server, log in as user0@example.org / password"
    );

    let app = instafood_mock_server::router(Arc::new(tokio::sync::Mutex::new(server)));
    tracing::info!("listening on {}", opt.addr);
    axum::Server::bind(&opt.addr)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}
