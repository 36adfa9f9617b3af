//! Demo command set registered by the shell.

use std::collections::BTreeMap;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use anyhow::anyhow;
use cmdtree::parser::{ChoiceParser, Flag, FlagParser, IntegerParser, StringParser};
use cmdtree::{
    Argument, BasicSender, Command, CommandContext, CommandDispatcher, RegistrationError,
};

/// Key/value store behind `config get` and `config set`.
pub type SettingStore = Arc<Mutex<BTreeMap<String, String>>>;

/// Register every demo command on `dispatcher` as one batch.
pub fn register(
    dispatcher: &Arc<CommandDispatcher<BasicSender>>,
    settings: SettingStore,
) -> Result<(), RegistrationError> {
    dispatcher.register_all([
        help(Arc::downgrade(dispatcher)),
        echo(),
        give(),
        config_get(Arc::clone(&settings)),
        config_set(settings),
        kick(),
        roll(),
    ])
}

fn help(dispatcher: Weak<CommandDispatcher<BasicSender>>) -> Command<BasicSender> {
    Command::builder("help")
        .optional("query", StringParser::greedy())
        .description("list the commands you can run")
        .handler(move |ctx| {
            let dispatcher = dispatcher
                .upgrade()
                .ok_or_else(|| anyhow!("dispatcher is shutting down"))?;
            let query: String = ctx.get("query").unwrap_or_default();
            for entry in dispatcher.help(ctx.sender(), &query) {
                let syntax = dispatcher.render(&entry.syntax);
                match entry.description {
                    Some(description) => println!("{syntax:<40} {description}"),
                    None => println!("{syntax}"),
                }
            }
            Ok(())
        })
}

fn echo() -> Command<BasicSender> {
    Command::builder("echo")
        .required("message", StringParser::greedy())
        .description("print a message")
        .handler(|ctx| {
            let message: String = ctx.get("message").unwrap_or_default();
            println!("{message}");
            Ok(())
        })
}

fn give() -> Command<BasicSender> {
    Command::builder("give")
        .required("amount", IntegerParser::range(1, 64))
        .argument(
            Argument::optional("target", StringParser::single())
                .with_default("self")
                .with_description("who receives the items"),
        )
        .description("give items")
        .handler(|ctx| {
            let amount: i64 = ctx.get("amount").unwrap_or_default();
            let target: String = ctx.get("target").unwrap_or_default();
            println!("gave {amount} to {target}");
            Ok(())
        })
}

/// Completes setting keys from the live store.
fn setting_keys(
    settings: SettingStore,
) -> impl Fn(&CommandContext<'_, BasicSender>, &str) -> Vec<String> + Send + Sync + 'static {
    move |_: &CommandContext<'_, BasicSender>, _: &str| {
        let settings = settings.lock().unwrap_or_else(PoisonError::into_inner);
        settings.keys().cloned().collect()
    }
}

fn config_get(settings: SettingStore) -> Command<BasicSender> {
    Command::builder("config")
        .literal("get")
        .argument(
            Argument::required("key", StringParser::single())
                .with_suggestions(setting_keys(Arc::clone(&settings))),
        )
        .description("read a setting")
        .handler(move |ctx| {
            let key: String = ctx.get("key").unwrap_or_default();
            let settings = settings.lock().unwrap_or_else(PoisonError::into_inner);
            match settings.get(&key) {
                Some(value) => {
                    println!("{key} = {value}");
                    Ok(())
                }
                None => Err(anyhow!("setting '{key}' is not set")),
            }
        })
}

fn config_set(settings: SettingStore) -> Command<BasicSender> {
    Command::builder("config")
        .literal("set")
        .argument(
            Argument::required("key", StringParser::single())
                .with_suggestions(setting_keys(Arc::clone(&settings))),
        )
        .required("value", StringParser::greedy())
        .description("change a setting")
        .handler(move |ctx| {
            let key: String = ctx.get("key").unwrap_or_default();
            let value: String = ctx.get("value").unwrap_or_default();
            println!("{key} = {value}");
            settings
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, value);
            Ok(())
        })
}

fn kick() -> Command<BasicSender> {
    Command::builder("kick")
        .required("player", StringParser::single())
        .flags(
            FlagParser::new()
                .flag(
                    Flag::presence("silent")
                        .alias('s')
                        .description("do not announce the kick"),
                )
                .flag(
                    Flag::with_value("reason", StringParser::single())
                        .description("reason shown to the player"),
                ),
        )
        .permission("admin.kick")
        .description("remove a player")
        .handler(|ctx| {
            let player: String = ctx.get("player").unwrap_or_default();
            let reason: Option<String> = ctx.flag("reason");
            let mut line = format!("kicked {player}");
            if let Some(reason) = reason {
                line.push_str(&format!(" ({reason})"));
            }
            if ctx.has_flag("silent") {
                line.push_str(" silently");
            }
            println!("{line}");
            Ok(())
        })
}

fn roll() -> Command<BasicSender> {
    Command::builder("roll")
        .required("sides", ChoiceParser::new(["d4", "d6", "d20"]))
        .description("roll a die")
        .handler(|ctx| {
            let die: String = ctx.get("sides").unwrap_or_default();
            let sides: u64 = die
                .trim_start_matches('d')
                .parse()
                .map_err(|_| anyhow!("unsupported die '{die}'"))?;
            let face = RandomState::new().build_hasher().finish() % sides + 1;
            println!("{die}: {face}");
            Ok(())
        })
}
