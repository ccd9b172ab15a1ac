use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error};
use recipe_snap::{
    pipelines, Provider, RecipeImprovements, RecipeSuggester, RecipeSuggesterBuilder,
    SuggestionResult,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const NO_IMAGE_PLACEHOLDER: &str = "[no illustration]";

/// Suggest illustrated recipes from a photo of ingredients
#[derive(Parser, Debug)]
#[command(name = "recipe-snap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short = 'p', long, global = true, value_enum, help = "AI provider to use")]
    provider: Option<ProviderArg>,

    #[arg(long, global = true, value_name = "KEY", help = "API key for the provider")]
    api_key: Option<String>,

    #[arg(short = 'm', long, global = true, value_name = "MODEL", help = "Recipe model name")]
    model: Option<String>,

    #[arg(long, global = true, help = "Print results as JSON")]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Suggest recipes for a photo of ingredients
    Suggest {
        #[arg(value_name = "PHOTO", help = "Image file (jpg, png, webp, gif, heic)")]
        photo: PathBuf,

        #[arg(long, value_name = "MODEL", help = "Image model used for illustrations")]
        image_model: Option<String>,

        #[arg(long, value_name = "COUNT", help = "Minimum number of recipes to ask for")]
        min_recipes: Option<u32>,

        #[arg(long, value_name = "SECONDS", help = "Give up after this many seconds")]
        timeout: Option<u64>,
    },
    /// Generate improvement ideas for recipe suggestions
    Improve {
        #[arg(value_name = "RECIPE", required = true, help = "Recipe suggestions to improve")]
        recipes: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ProviderArg {
    Google,
    Openai,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Google => Provider::Google,
            ProviderArg::Openai => Provider::OpenAI,
        }
    }
}

fn configure(cli: &Cli) -> RecipeSuggesterBuilder {
    let mut builder = RecipeSuggester::builder();
    if let Some(provider) = cli.provider {
        builder = builder.provider(provider.into());
    }
    if let Some(api_key) = &cli.api_key {
        builder = builder.api_key(api_key.clone());
    }
    if let Some(model) = &cli.model {
        builder = builder.model(model.clone());
    }
    builder
}

fn print_suggestions(result: &SuggestionResult) {
    if result.is_empty() {
        println!("No recipes found. Try another photo with clearer ingredients.");
        return;
    }

    println!("We found {} recipe suggestions for you.\n", result.len());
    for (index, recipe) in result.recipes.iter().enumerate() {
        println!("{}. {}", index + 1, recipe.title);
        println!("   {}", recipe.description);
        match &recipe.image_data_uri {
            Some(uri) => println!("   Image: {} bytes of inline data", uri.len()),
            None => println!("   Image: {}", NO_IMAGE_PLACEHOLDER),
        }
        println!("\n   Ingredients:");
        for ingredient in &recipe.ingredients {
            println!("   - {}", ingredient);
        }
        println!("\n   Instructions:");
        for step in recipe.steps() {
            println!("   {}", step);
        }
        println!();
    }
}

fn print_improvements(improvements: &RecipeImprovements) {
    if improvements.improved_recipe_ideas.is_empty() {
        println!("No improvement ideas were generated.");
        return;
    }
    for idea in &improvements.improved_recipe_ideas {
        println!("- {}", idea);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let builder = configure(&cli);

    match cli.command {
        Commands::Suggest {
            photo,
            image_model,
            min_recipes,
            timeout,
        } => {
            let mut builder = builder.photo_path(photo);
            if let Some(image_model) = image_model {
                builder = builder.image_model(image_model);
            }
            if let Some(count) = min_recipes {
                builder = builder.min_recipes(count);
            }
            if let Some(seconds) = timeout {
                builder = builder.timeout(Duration::from_secs(seconds));
            }

            let result = builder
                .build()
                .await
                .map_err(|e| format!("Failed to get suggestions: {}", e))?;
            debug!("{:#?}", result);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_suggestions(&result);
            }
        }
        Commands::Improve { recipes } => {
            let gateway = builder.build_gateway()?;
            let improvements = pipelines::improve_recipe_ideas(gateway.as_ref(), &recipes)
                .await
                .map_err(|e| format!("Failed to get improvement ideas: {}", e))?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&improvements)?);
            } else {
                print_improvements(&improvements);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
