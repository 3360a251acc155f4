use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use vkscope::{
    aggregate, human_readable_group, human_readable_post, human_readable_sub, human_readable_user, rank, PeopleFilter,
    split_fields, write_ranking, write_records, Collection, KeyGranularity, OutputFormat, Record, SetMode, StatKey,
    VkClient, Window,
};

const DEFAULT_FIELDS: &str = "bdate,city,contacts,country,domain,education,last_seen,relation,sex,status,schools,universities";

#[derive(Parser)]
#[command(name = "vkscope", version, about = "Query and aggregate VK user collections")]
struct Cli {
    /// Show progress bars for multi-user fetches and downloads
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SetArgs {
    /// Comma separated field list
    #[arg(short, long, default_value = DEFAULT_FIELDS)]
    fields: String,
    /// Union across users (default for two or more users is intersection)
    #[arg(short, long)]
    join: bool,
    /// Human-readable JSON
    #[arg(long)]
    human: bool,
    /// Output file (stdout when omitted); `.jsonl`/`.zst` select NDJSON/compressed NDJSON
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Sort people by a field or JSON pointer
    #[arg(long)]
    sort_by: Option<String>,
    /// Keep people whose field matches one of the values: `key=v1,v2` (repeatable)
    #[arg(long = "filter")]
    filters: Vec<String>,
    /// Drop matching people instead of keeping them
    #[arg(long)]
    filter_reverse: bool,
    #[arg(required = true)]
    user_ids: Vec<String>,
}

impl SetArgs {
    fn people_filter(&self) -> Result<PeopleFilter> {
        let mut f = PeopleFilter::new().reverse(self.filter_reverse);
        if let Some(key) = &self.sort_by {
            f = f.sort_by(key.clone());
        }
        for raw in &self.filters {
            f = f.parse_filter(raw).ok_or_else(|| anyhow!("filter must look like key=v1,v2: {}", raw))?;
        }
        Ok(f)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Friends of one or more users
    Friends {
        #[command(flatten)]
        set: SetArgs,
        /// Identifiers only
        #[arg(short = 'I', long)]
        id_only: bool,
        /// Statistics instead of the list: city|c, country|co, university|u, school|s, or a JSON pointer
        #[arg(short, long)]
        stat: Option<String>,
    },
    /// Subscriptions (profiles and communities) of one or more users
    Subs {
        #[command(flatten)]
        set: SetArgs,
    },
    /// Communities of one or more users
    Groups {
        #[command(flatten)]
        set: SetArgs,
    },
    /// Followers of one or more users
    Followers {
        #[command(flatten)]
        set: SetArgs,
    },
    /// Wall posts inside an optional time window
    Posts {
        owner: String,
        /// Oldest post time (unix seconds, RFC3339 or YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Newest post time (unix seconds, RFC3339 or YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Maximum number of posts
        #[arg(short, long)]
        count: Option<usize>,
        #[arg(long)]
        human: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// One user's profile
    User {
        user_id: String,
        #[arg(short, long, default_value = DEFAULT_FIELDS)]
        fields: String,
        #[arg(long)]
        human: bool,
        /// Also download every photo of the profile
        #[arg(short, long)]
        save_pics: bool,
        #[arg(short, long)]
        picture_path: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Gifts received by a user
    Gifts {
        user_id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Last time the user was online (UTC+3)
    Lastseen { user_id: String },
    /// Download every photo of a profile
    Photos {
        user_id: String,
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn parse_time(s: &str) -> Result<i64> {
    if let Ok(ts) = s.trim().parse::<i64>() {
        return Ok(ts);
    }
    if let Ok(dt) = OffsetDateTime::parse(s.trim(), &Rfc3339) {
        return Ok(dt.unix_timestamp());
    }
    let date = Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("unrecognized time: {}", s))?;
    Ok(date.midnight().assume_utc().unix_timestamp())
}

fn set_mode(join: bool) -> SetMode {
    if join { SetMode::Union } else { SetMode::Intersection }
}

fn emit(client: &VkClient, records: &[Record], output: Option<&PathBuf>) -> Result<()> {
    let format = match output {
        Some(p) => OutputFormat::for_path(p, true),
        None => OutputFormat::Json { pretty: true },
    };
    write_records(records, output.map(|p| p.as_path()), format, client.options().write_buffer_bytes)
}

/// Fetch one collection per user, then union/intersect them.
fn collect_sets<F>(client: &VkClient, set: &SetArgs, granularity: &KeyGranularity, fetch: F) -> Result<Collection>
where
    F: Sync + Fn(&VkClient, &str, &[String]) -> vkscope::Result<Collection>,
{
    let fields = split_fields(&set.fields);
    let per_user = client.for_each_user(&set.user_ids, "Fetching users", |c, u| fetch(c, u, &fields))?;
    Ok(aggregate(&per_user, set_mode(set.join), granularity)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = VkClient::from_env()?.progress(cli.progress);
    let full = KeyGranularity::FullRecord { exclude: client.options().exclude_fields.clone() };

    match cli.command {
        Command::Friends { mut set, id_only, stat } => {
            if id_only {
                set.fields.clear();
            }
            let granularity = if id_only { KeyGranularity::IdentifierOnly } else { full };
            let friends = collect_sets(&client, &set, &granularity, |c, u, f| c.friends(u, f))?;
            let friends = set.people_filter()?.apply(friends);

            if let Some(stat) = stat {
                let key = StatKey::parse(&stat).ok_or_else(|| anyhow!("unknown statistic: {}", stat))?;
                return write_ranking(&rank(&friends, &key), set.output.as_deref(), true);
            }
            let mut friends = friends;
            if set.human {
                friends.iter_mut().for_each(human_readable_user);
            }
            emit(&client, &friends, set.output.as_ref())
        }
        Command::Subs { set } => {
            let mut subs = collect_sets(&client, &set, &full, |c, u, f| c.subscriptions(u, f).map(|s| s.all))?;
            if set.human {
                subs.iter_mut().for_each(human_readable_sub);
            }
            emit(&client, &subs, set.output.as_ref())
        }
        Command::Groups { set } => {
            let mut groups = collect_sets(&client, &set, &full, |c, u, f| c.groups(u, f))?;
            if set.human {
                groups.iter_mut().for_each(human_readable_group);
            }
            emit(&client, &groups, set.output.as_ref())
        }
        Command::Followers { set } => {
            let followers = collect_sets(&client, &set, &full, |c, u, f| c.followers(u, f))?;
            let mut followers = set.people_filter()?.apply(followers);
            if set.human {
                followers.iter_mut().for_each(human_readable_user);
            }
            emit(&client, &followers, set.output.as_ref())
        }
        Command::Posts { owner, start, end, count, human, output } => {
            let start = start.as_deref().map(parse_time).transpose()?;
            let end = end.as_deref().map(parse_time).transpose()?;
            let mut posts = client.posts(&owner, Window::new(start, end), count)?;
            if human {
                posts.iter_mut().for_each(human_readable_post);
            }
            emit(&client, &posts, output.as_ref())
        }
        Command::User { user_id, fields, human, save_pics, picture_path, output } => {
            if save_pics {
                let report = client.save_pictures(&user_id, picture_path.as_deref())?;
                if !report.ok {
                    eprintln!("Not all files were downloaded ({} failed), see the log above", report.failed.len());
                }
            }
            let mut user = client.user(&user_id, &split_fields(&fields))?;
            vkscope::clear_empty(&mut user);
            if human {
                human_readable_user(&mut user);
            }
            emit(&client, std::slice::from_ref(&user), output.as_ref())
        }
        Command::Gifts { user_id, output } => {
            let gifts = client.gifts(&user_id)?;
            emit(&client, &gifts, output.as_ref())
        }
        Command::Lastseen { user_id } => {
            let seen = client.last_seen(&user_id)?;
            let fmt = format_description!("[hour]:[minute]:[second] [day].[month].[year]");
            println!("{}", seen.format(fmt)?);
            Ok(())
        }
        Command::Photos { user_id, dir } => {
            let report = client.save_pictures(&user_id, dir.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.ok { Ok(()) } else { Err(anyhow!("not all files were downloaded")) }
        }
    }
}
