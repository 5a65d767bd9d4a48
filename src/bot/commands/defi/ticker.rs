use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use futures::future::BoxFuture;
use regex::Regex;
use tracing::debug;

use crate::{api::coingecko::{get_date_str, Coin}, bot::{chat_event::chat_event::{ChatEvent, InteractionEvent}, choice::choice::{ChoiceHandler, ChoiceOptions}, commands::{commands::{BotResult, Category, CommandInfo, CommandT, FnCommand}, defi::chart::{get_chart_color_config, render_historical_market_chart, HistoricalChart, CHART_FILENAME}}, db::tokens::find_token, replies::Replies, response::{compose::{compose_discord_exit_button, compose_discord_selection_row, compose_embed_message, get_header, thumbnails, EmbedOptions}, emoji::get_emoji, format::{get_change_percentage, number_with_commas, price_in}, response::{CommandResponse, Reply, SelectOption}}, state::def::{AppState, BotError}}};

pub const TICKER_SELECT_ID: &str = "ticker_view_option";
pub const DEFAULT_DAYS: u32 = 7;
const DEFAULT_CURRENCY: &str = "usd";
/// `(days, label, emoji)` offered by the range selector.
const DAY_OPTIONS: [(u32, &str, &str); 6] = [
    (1, "1 day", "🕒"),
    (7, "7 days", "📆"),
    (30, "30 days", "📆"),
    (60, "60 days", "📆"),
    (90, "90 days", "📆"),
    (365, "1 year", "📆"),
];

lazy_static::lazy_static! {
    static ref TICKER_QUERY: Regex = Regex::new(r"^[A-Za-z0-9-]+(/[A-Za-z]+)?$").expect("ticker query pattern");
}

/// Everything needed to re-render the ticker message for another day range.
#[derive(Debug, Clone)]
struct TickerView {
    event: ChatEvent,
    coin: Coin,
    currency: String,
}

pub fn ticker_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        CommandInfo::new("ticker", "Ticker", Category::Defi).runs_without_action().complex(),
        |event, state| Box::pin(async move { run_ticker(event, state).await }),
        |event, state| Box::pin(async move { Ok(ticker_help(&event, &state.config.prefix)) }),
    ))
}

/// `ftm` -> `("ftm", "usd")`, `ftm/EUR` -> `("ftm", "eur")`. `None` for anything else.
pub fn parse_ticker_query(query: &str) -> Option<(String, String)> {
    if !TICKER_QUERY.is_match(query) {
        return None;
    }

    let (symbol, currency) = query.split_once('/').unwrap_or((query, DEFAULT_CURRENCY));
    Some((symbol.to_string(), currency.to_lowercase()))
}

/// Splits a range selector value `<id>_<currency>_<days>`.
pub fn parse_choice_value(value: &str) -> Option<(String, String, u32)> {
    let mut parts = value.rsplitn(3, '_');
    let days = parts.next()?.parse().ok()?;
    let currency = parts.next()?;
    let id = parts.next()?;

    if id.is_empty() || currency.is_empty() {
        return None;
    }
    Some((id.to_string(), currency.to_string(), days))
}

async fn run_ticker(event: ChatEvent, state: Arc<AppState>) -> BotResult<Option<CommandResponse>> {
    let query = event.args().get(1).map(|q| q.to_string());
    let Some((symbol, currency)) = query.as_deref().and_then(parse_ticker_query) else {
        return Ok(Some(ticker_help(&event, &state.config.prefix).into()));
    };

    let coin_id = match find_token(&state.db, &symbol).await? {
        Some(token) => token.coin_id,
        None => symbol.to_lowercase(),
    };

    let coin = match state.market.get_coin(&coin_id).await {
        Ok(coin) => coin,
        Err(BotError::NotFound(_)) => {
            debug!("No coin for ticker query {symbol}");
            return Ok(Some(Reply::text(Replies::coin_not_found(&symbol)).into()));
        }
        Err(e) => return Err(e),
    };

    let chart = render_historical_market_chart(state.market.as_ref(), &coin.id, &currency, DEFAULT_DAYS).await?;
    let view = TickerView { event, coin, currency };

    Ok(Some(render_view(&view, chart, DEFAULT_DAYS, &view.event.user.tag)))
}

fn render_view(view: &TickerView, chart: HistoricalChart, days: u32, user_tag: &str) -> CommandResponse {
    let reply = compose_ticker_reply(view, chart, days);

    CommandResponse::new(reply).with_choice(ChoiceOptions {
        user_id: view.event.user.id,
        user_tag: user_tag.to_string(),
        channel_id: view.event.channel_id,
        guild_id: view.event.guild_id,
        timeout: None,
        handler: ticker_choice_handler(view.clone()),
    })
}

fn ticker_choice_handler(view: TickerView) -> ChoiceHandler {
    Arc::new(move |interaction: InteractionEvent, state: Arc<AppState>| -> BoxFuture<'static, BotResult<CommandResponse>> {
        let view = view.clone();
        Box::pin(async move {
            let value = interaction.values.first().ok_or_else(|| BotError::Custom("Empty ticker selection".to_string()))?;
            let (id, currency, days) = parse_choice_value(value)
                .ok_or_else(|| BotError::Custom(format!("Malformed ticker selection {value}")))?;

            let chart = render_historical_market_chart(state.market.as_ref(), &id, &currency, days).await?;
            let view = TickerView { currency, ..view };
            Ok(render_view(&view, chart, days, &interaction.user.tag))
        })
    })
}

fn compose_ticker_reply(view: &TickerView, chart: HistoricalChart, days: u32) -> Reply {
    let TickerView { event, coin, currency } = view;
    let market = &coin.market_data;
    let blank = get_emoji("blank");
    let upper = currency.to_uppercase();
    let rank = coin.market_cap_rank.map(|r| format!(" (#{r})")).unwrap_or_default();
    let amount = |v: Option<f64>| v.map(number_with_commas).unwrap_or_else(|| "N/A".to_string());
    let change = |v: Option<f64>| v.map(get_change_percentage).unwrap_or_else(|| "N/A".to_string());

    let embed = compose_embed_message(Some(event), EmbedOptions {
        color: Some(get_chart_color_config(&coin.id).border_color),
        author: Some((coin.name.clone(), coin.image.small.clone())),
        footer: vec![
            "Data fetched from CoinGecko.com".to_string(),
            format!("{} - {}", chart.data.from, chart.data.to),
        ],
        image: Some(format!("attachment://{CHART_FILENAME}")),
        ..Default::default()
    })
    .field(format!("Market cap ({upper})"), format!("{}{rank} {blank}", amount(price_in(&market.market_cap, currency))), true)
    .field(format!("Price ({upper})"), amount(price_in(&market.current_price, currency)), true)
    .field("\u{200B}", "\u{200B}", true)
    .field("Change (1h)", change(price_in(&market.price_change_percentage_1h_in_currency, currency)), true)
    .field(format!("Change (24h) {blank}"), change(price_in(&market.price_change_percentage_24h_in_currency, currency)), true)
    .field("Change (7d)", change(price_in(&market.price_change_percentage_7d_in_currency, currency)), true);

    Reply {
        content: Some(get_header("View historical market chart", &event.user.tag, None)),
        embeds: vec![embed],
        files: vec![chart.attachment],
        components: vec![
            compose_discord_selection_row(TICKER_SELECT_ID, "Make a selection", day_options(&coin.id, currency, days)),
            compose_discord_exit_button(),
        ],
    }
}

fn day_options(id: &str, currency: &str, selected: u32) -> Vec<SelectOption> {
    let now = Utc::now();
    DAY_OPTIONS
        .iter()
        .map(|(days, label, emoji)| {
            let since = now - ChronoDuration::days(i64::from(*days));
            SelectOption {
                label: label.to_string(),
                value: format!("{id}_{currency}_{days}"),
                emoji: Some(emoji.to_string()),
                description: Some(format!(
                    "{} - {}",
                    get_date_str(since.timestamp_millis()),
                    get_date_str(now.timestamp_millis())
                )),
                default: *days == selected,
            }
        })
        .collect()
}

pub fn ticker_help(event: &ChatEvent, prefix: &str) -> Reply {
    let embed = compose_embed_message(Some(event), EmbedOptions {
        thumbnail: Some(thumbnails::TOKENS.to_string()),
        description: Some("```Display coin price and market cap.\nData is fetched from [CoinGecko](https://coingecko.com/)```".to_string()),
        usage: Some(format!("{prefix}ticker <token>")),
        ..Default::default()
    })
    .field("_Examples_", format!("`{prefix}ticker fantom` or `{prefix}ticker ftm`"), false);

    Reply::embed(embed)
}

#[cfg(test)]
mod tests {
    use serenity::all::MessageId;

    use super::*;
    use crate::bot::{choice::choice::ChoiceKey, handler::handler::{handle_interaction, handle_message}, response::response::ComponentRow, testing::{message, select, test_state, ClientCall, FakeMarket}};

    #[test]
    fn parses_symbol_and_currency() {
        assert_eq!(parse_ticker_query("ftm"), Some(("ftm".to_string(), "usd".to_string())));
        assert_eq!(parse_ticker_query("ftm/EUR"), Some(("ftm".to_string(), "eur".to_string())));
        assert_eq!(parse_ticker_query("reaper-token"), Some(("reaper-token".to_string(), "usd".to_string())));
        assert_eq!(parse_ticker_query("ftm/"), None);
        assert_eq!(parse_ticker_query("ftm/usd/eur"), None);
        assert_eq!(parse_ticker_query("$ftm"), None);
    }

    #[test]
    fn parses_selector_values_from_the_right() {
        assert_eq!(parse_choice_value("fantom_usd_30"), Some(("fantom".to_string(), "usd".to_string(), 30)));
        assert_eq!(parse_choice_value("reaper-token_eur_365"), Some(("reaper-token".to_string(), "eur".to_string(), 365)));
        assert_eq!(parse_choice_value("fantom_usd"), None);
        assert_eq!(parse_choice_value("fantom_usd_x"), None);
    }

    #[test]
    fn seven_days_is_the_default_option() {
        let options = day_options("fantom", "usd", DEFAULT_DAYS);
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["fantom_usd_1", "fantom_usd_7", "fantom_usd_30", "fantom_usd_60", "fantom_usd_90", "fantom_usd_365"]);
        assert_eq!(options.iter().filter(|o| o.default).count(), 1);
        assert!(options[1].default);
    }

    #[tokio::test]
    async fn ticker_end_to_end() {
        let market = Arc::new(FakeMarket::default());
        let (state, client) = test_state(market.clone()).await;

        handle_message(state.clone(), message("!ticker ftm")).await.unwrap();

        let calls = client.calls().await;
        assert_eq!(calls.len(), 1);
        let ClientCall::Send { message: sent, reply, .. } = &calls[0] else { panic!("expected a send") };

        let embed = &reply.embeds[0];
        assert_eq!(embed.author.as_ref().map(|a| a.name.as_str()), Some("Fantom"));
        assert_eq!(embed.image.as_deref(), Some("attachment://chart.png"));
        assert_eq!(embed.color, Some(0x009cdb));
        assert_eq!(embed.fields.len(), 6);
        assert_eq!(embed.fields[0].name, "Market cap (USD)");
        assert!(embed.fields[0].value.starts_with("1,234,567,890 (#55)"));
        assert_eq!(embed.fields[1].value, "0.45");
        assert_eq!(embed.fields[3].value, "📈 +0.5%");
        assert_eq!(embed.fields[4].value, "📉 -2.25%");
        assert_eq!(reply.files[0].filename, "chart.png");
        assert_eq!(reply.content.as_deref(), Some("> **View historical market chart • [** neko#0001 **]**"));

        let menu = reply.select_menu().unwrap();
        assert_eq!(menu.custom_id, TICKER_SELECT_ID);
        assert_eq!(menu.default_option().map(|o| o.value.as_str()), Some("fantom_usd_7"));
        assert!(matches!(reply.components.last(), Some(ComponentRow::Buttons(_))));

        assert!(state.choices.is_armed(*sent).await);
        assert_eq!(market.history_calls.lock().await.as_slice(), &[("fantom".to_string(), "usd".to_string(), 7)]);
    }

    #[tokio::test]
    async fn selecting_thirty_days_rerenders_and_rearms() {
        let market = Arc::new(FakeMarket::default());
        let (state, client) = test_state(market.clone()).await;

        handle_message(state.clone(), message("!tick FTM")).await.unwrap();
        let sent = MessageId::new(1000);

        handle_interaction(state.clone(), select(sent, TICKER_SELECT_ID, "fantom_usd_30")).await.unwrap();

        let calls = client.calls().await;
        let ClientCall::Edit { message, reply, .. } = &calls[1] else { panic!("expected an edit") };
        assert_eq!(*message, sent);
        let menu = reply.select_menu().unwrap();
        assert_eq!(menu.default_option().map(|o| o.value.as_str()), Some("fantom_usd_30"));
        assert_eq!(menu.options.iter().filter(|o| o.default).count(), 1);
        assert_eq!(reply.files.len(), 1);

        assert_eq!(market.history_calls.lock().await.last(), Some(&("fantom".to_string(), "usd".to_string(), 30)));

        let key = ChoiceKey {
            message_id: sent,
            channel_id: serenity::all::ChannelId::new(20),
            guild_id: Some(serenity::all::GuildId::new(30)),
            user_id: serenity::all::UserId::new(40),
        };
        assert!(state.choices.resolve(&key).await.is_some());
    }

    #[tokio::test]
    async fn invalid_query_returns_help() {
        let (state, client) = test_state(FakeMarket::default()).await;

        handle_message(state.clone(), message("!ticker $$$")).await.unwrap();
        handle_message(state.clone(), message("!ticker")).await.unwrap();

        let sent = client.sent().await;
        assert_eq!(sent.len(), 2);
        for reply in sent {
            assert_eq!(reply.embeds[0].thumbnail.as_deref(), Some(thumbnails::TOKENS));
            assert!(reply.components.is_empty());
        }
    }

    #[tokio::test]
    async fn unknown_coin_is_reported() {
        let (state, client) = test_state(FakeMarket::default()).await;

        handle_message(state.clone(), message("!ticker doge")).await.unwrap();

        let sent = client.sent().await;
        assert_eq!(sent[0].content.as_deref(), Some("Couldn't find any token matching `doge`."));
        assert!(!state.choices.is_armed(MessageId::new(1000)).await);
    }
}
