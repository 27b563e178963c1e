use std::path::PathBuf;

use anyhow::Context;
use mazhar_client::{
    admin_rows,
    api::{ArticleId, CommentId, NewComment},
    CommentStore, FilePersistence, SortOrder,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// JSON file holding the comments of all articles
    #[structopt(
        short,
        long,
        env = "MAZHAR_COMMENTS_FILE",
        default_value = "comments.json"
    )]
    store: PathBuf,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
struct Form {
    /// Name displayed next to the comment
    #[structopt(short, long)]
    name: String,

    /// Never displayed
    #[structopt(short, long)]
    email: String,

    content: String,
}

impl Form {
    fn into_new_comment(self) -> NewComment {
        NewComment::new(self.name, self.email, self.content)
    }
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Add a top-level comment to an article
    Add {
        article: String,

        #[structopt(flatten)]
        form: Form,
    },

    /// Reply to a comment, at any depth
    Reply {
        article: String,
        parent: CommentId,

        #[structopt(flatten)]
        form: Form,
    },

    /// Add a like to a comment, and print its new like count
    Like {
        article: String,
        id: CommentId,
    },

    /// Remove a like from a comment, never going below zero, and print its new like count
    Unlike {
        article: String,
        id: CommentId,
    },

    /// Replace the content of a comment
    Edit {
        article: String,
        id: CommentId,
        content: String,
    },

    /// Delete a comment along with all its replies
    Delete {
        article: String,
        id: CommentId,
    },

    /// Print the comments of an article
    List {
        article: String,

        /// One of newest, oldest or popular; insertion order if not set
        #[structopt(long)]
        sort: Option<SortOrder>,
    },

    /// Print the number of comments of an article, replies included
    Count { article: String },

    /// Print all the comments of all articles as a flat list, newest first
    Admin,

    /// Delete all the comments of an article
    Clear { article: String },
}

fn print<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{json}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    tracing::debug!(store = %opt.store.display(), "opening comment store");
    let mut store = CommentStore::open(FilePersistence::new(opt.store));

    let not_found = |article: &str, id: &CommentId| {
        anyhow::anyhow!("article {article:?} has no comment with id {id}")
    };

    match opt.cmd {
        Command::Add { article, form } => {
            let comment = store
                .add_comment(&ArticleId(article), form.into_new_comment())
                .context("adding comment")?;
            print(&comment)?;
        }
        Command::Reply {
            article,
            parent,
            form,
        } => {
            let reply = store
                .add_reply(&ArticleId(article), &parent, form.into_new_comment())
                .context("adding reply")?;
            print(&reply)?;
        }
        Command::Like { article, id } => {
            let likes = store
                .like_comment(&ArticleId::from(&article[..]), &id)
                .ok_or_else(|| not_found(&article, &id))?;
            print(&likes)?;
        }
        Command::Unlike { article, id } => {
            let likes = store
                .unlike_comment(&ArticleId::from(&article[..]), &id)
                .ok_or_else(|| not_found(&article, &id))?;
            print(&likes)?;
        }
        Command::Edit {
            article,
            id,
            content,
        } => {
            let edited = store
                .edit_comment(&ArticleId(article), &id, content)
                .context("editing comment")?;
            print(&edited)?;
        }
        Command::Delete { article, id } => {
            let removed = store
                .delete_comment(&ArticleId::from(&article[..]), &id)
                .ok_or_else(|| not_found(&article, &id))?;
            print(&removed)?;
        }
        Command::List { article, sort } => {
            let forest = store.get_comments(&ArticleId(article));
            match sort {
                None => print(&forest)?,
                Some(order) => print(&order.sorted(&forest))?,
            }
        }
        Command::Count { article } => {
            print(&store.get_comment_count(&ArticleId(article)))?;
        }
        Command::Admin => {
            print(&admin_rows(&store.snapshot()))?;
        }
        Command::Clear { article } => {
            print(&store.clear_comments(&ArticleId(article)))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_is_described() {
        let mut help = Vec::new();
        <Opt as structopt::StructOpt>::clap()
            .write_help(&mut help)
            .unwrap();
        let help = String::from_utf8(help).unwrap();
        let commands = help
            .lines()
            .skip_while(|l| !l.starts_with("SUBCOMMANDS"))
            .skip(1)
            .collect::<Vec<_>>();
        for name in ["like", "unlike", "edit", "delete"] {
            let line = commands
                .iter()
                .find(|l| l.split_whitespace().next() == Some(name))
                .unwrap_or_else(|| panic!("command {name} is not listed"));
            assert!(
                line.split_whitespace().count() > 1,
                "command {name} has no help"
            );
        }
    }
}
