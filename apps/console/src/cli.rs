//! # Command Line
//!
//! `stockbook` subcommands and their flags. Text values go through the
//! `stockbook_core::validation` parsers, so a bad number is rejected with
//! the same message a repository would give.
//!
//! ```text
//! stockbook [--config <path>] [--json] <command> [--flag value]...
//! ```

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use stockbook_core::error::ValidationResult;
use stockbook_core::validation::{parse_amount, parse_discount_percent, parse_quantity};
use stockbook_core::{CostBasis, ItemUpdate, NewItem, UnknownCostBasis};

#[derive(Debug, Parser)]
#[command(
    name = "stockbook",
    version,
    about = "Stock and sales ledger for a small shop",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (default: STOCKBOOK_CONFIG or the platform config dir)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List or search stock
    Items {
        /// Case-insensitive part of the item name
        #[arg(long)]
        search: Option<String>,
    },
    /// Add an item to stock
    AddItem(AddItemArgs),
    /// Change fields of an item
    EditItem(EditItemArgs),
    /// Delete an item (its sales stay in the ledger)
    RemoveItem {
        #[arg(long)]
        id: i64,
    },
    /// Sell units of one item to a customer
    Sell(SellArgs),
    /// List the sales ledger
    History,
    /// Sales, discount and revenue totals
    Summary,
    /// Profit and loss per sale
    ProfitLoss {
        /// current_stock or sale_snapshot (default from config)
        #[arg(long, value_parser = cost_basis)]
        basis: Option<CostBasis>,
    },
    /// Purchases per customer
    Customers,
    /// Distinct customers in order of first purchase
    CustomerList,
    /// Latest name used with a contact number
    CustomerName {
        #[arg(long)]
        contact: String,
    },
    /// Rewrite a customer's name and contact on every sale
    FixCustomer(CustomerFix),
    /// Stock value per item
    StockReport,
    /// Write the ledger as CSV
    ExportHistory {
        /// Target directory (default from config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct AddItemArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, value_parser = stock_quantity)]
    pub quantity: i64,

    #[arg(long, value_parser = price)]
    pub price: f64,

    #[arg(long, value_parser = cost_price, default_value = "0")]
    pub cost: f64,

    #[arg(long)]
    pub barcode: Option<String>,
}

impl AddItemArgs {
    pub fn to_new_item(&self) -> NewItem {
        let item = NewItem::new(self.name.clone(), self.quantity, self.price, self.cost);
        match &self.barcode {
            Some(barcode) => item.with_barcode(barcode.clone()),
            None => item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Args)]
#[command(group(
    ArgGroup::new("change")
        .required(true)
        .multiple(true)
        .args(["name", "quantity", "price", "cost"])
))]
pub struct EditItemArgs {
    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, value_parser = stock_quantity)]
    pub quantity: Option<i64>,

    #[arg(long, value_parser = price)]
    pub price: Option<f64>,

    #[arg(long, value_parser = cost_price)]
    pub cost: Option<f64>,
}

impl EditItemArgs {
    pub fn update(&self) -> ItemUpdate {
        ItemUpdate {
            name: self.name.clone(),
            quantity: self.quantity,
            price: self.price,
            cost_price: self.cost,
        }
    }
}

/// How a sale names its item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemRef {
    Id(i64),
    /// First item with this exact name, by id order.
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Args)]
#[command(group(ArgGroup::new("item_ref").required(true).args(["id", "item"])))]
pub struct SellArgs {
    /// Item id
    #[arg(long)]
    pub id: Option<i64>,

    /// Exact item name
    #[arg(long)]
    pub item: Option<String>,

    #[arg(long, value_parser = sale_quantity)]
    pub quantity: i64,

    /// Discount in percent, 0 to 100
    #[arg(long, value_parser = discount, default_value = "0")]
    pub discount: f64,

    /// Overrides the item's current price
    #[arg(long, value_parser = unit_price)]
    pub price: Option<f64>,

    #[arg(long)]
    pub customer: String,

    /// 10-digit contact number
    #[arg(long)]
    pub contact: String,
}

impl SellArgs {
    pub fn item_ref(&self) -> Option<ItemRef> {
        self.id
            .map(ItemRef::Id)
            .or_else(|| self.item.clone().map(ItemRef::Name))
    }
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct CustomerFix {
    #[arg(long)]
    pub old_name: String,

    #[arg(long)]
    pub old_contact: String,

    #[arg(long)]
    pub new_name: String,

    #[arg(long)]
    pub new_contact: String,
}

// =============================================================================
// Value Parsers
// =============================================================================

fn stock_quantity(text: &str) -> ValidationResult<i64> {
    parse_quantity("quantity", text, 0)
}

fn sale_quantity(text: &str) -> ValidationResult<i64> {
    parse_quantity("quantity_sold", text, 1)
}

fn price(text: &str) -> ValidationResult<f64> {
    parse_amount("price", text)
}

fn cost_price(text: &str) -> ValidationResult<f64> {
    parse_amount("cost_price", text)
}

fn unit_price(text: &str) -> ValidationResult<f64> {
    parse_amount("unit_price", text)
}

fn discount(text: &str) -> ValidationResult<f64> {
    parse_discount_percent(text)
}

fn cost_basis(text: &str) -> Result<CostBasis, UnknownCostBasis> {
    text.parse::<CostBasis>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("stockbook").chain(line.split_whitespace()))
    }

    #[test]
    fn test_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_globals_anywhere() {
        let cli = parse("--json summary --config shop.toml").unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("shop.toml")));
        assert_eq!(cli.command, Command::Summary);
    }

    #[test]
    fn test_help() {
        let err = parse("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand);

        let err = parse("sell --help").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("--customer"));
    }

    #[test]
    fn test_add_item() {
        let cli = parse("add-item --name Shirt --quantity 10 --price 200 --cost 120").unwrap();
        match cli.command {
            Command::AddItem(args) => {
                assert_eq!(args.to_new_item(), NewItem::new("Shirt", 10, 200.0, 120.0));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = parse("add-item --name Cap --quantity 5 --price 50 --barcode 123").unwrap();
        match cli.command {
            Command::AddItem(args) => {
                assert_eq!(
                    args.to_new_item(),
                    NewItem::new("Cap", 5, 50.0, 0.0).with_barcode("123")
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_quantity_uses_core_message() {
        let err = parse("add-item --name Shirt --quantity ten --price 200").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("quantity"));

        let err = parse("sell --id 1 --quantity 0 --customer A --contact 9876543210").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_sell() {
        let cli = parse(
            "sell --item Shirt --quantity 3 --discount 10 --customer Asha --contact 9876543210",
        )
        .unwrap();

        match cli.command {
            Command::Sell(args) => {
                assert_eq!(args.item_ref(), Some(ItemRef::Name("Shirt".to_string())));
                assert_eq!(args.quantity, 3);
                assert_eq!(args.discount, 10.0);
                assert_eq!(args.price, None);
                assert_eq!(args.customer, "Asha");
                assert_eq!(args.contact, "9876543210");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_sell_defaults_discount_and_needs_one_item_ref() {
        let cli = parse("sell --id 4 --quantity 1 --customer Asha --contact 9876543210").unwrap();
        match cli.command {
            Command::Sell(args) => {
                assert_eq!(args.item_ref(), Some(ItemRef::Id(4)));
                assert_eq!(args.discount, 0.0);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let err = parse("sell --id 4 --item Shirt --quantity 1 --customer A --contact 1")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let err = parse("sell --quantity 1 --customer A --contact 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_discount_over_limit() {
        let err = parse("sell --id 1 --quantity 1 --discount 120 --customer A --contact 1")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_edit_item_needs_a_change() {
        let err = parse("edit-item --id 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let cli = parse("edit-item --id 1 --cost 150").unwrap();
        match cli.command {
            Command::EditItem(args) => {
                assert_eq!(args.id, 1);
                assert_eq!(
                    args.update(),
                    ItemUpdate {
                        cost_price: Some(150.0),
                        ..Default::default()
                    }
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_profit_loss_basis() {
        let cli = parse("profit-loss --basis snapshot").unwrap();
        assert_eq!(
            cli.command,
            Command::ProfitLoss {
                basis: Some(CostBasis::SaleSnapshot)
            }
        );

        let err = parse("profit-loss --basis fifo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_fix_customer_flags() {
        let cli = parse(
            "fix-customer --old-name Asha --old-contact 9876543210 \
             --new-name Asha --new-contact 9123456780",
        )
        .unwrap();
        assert_eq!(
            cli.command,
            Command::FixCustomer(CustomerFix {
                old_name: "Asha".to_string(),
                old_contact: "9876543210".to_string(),
                new_name: "Asha".to_string(),
                new_contact: "9123456780".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_command_and_option() {
        assert_eq!(parse("restock").unwrap_err().kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(
            parse("history --limit 5").unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(parse("remove-item --id").unwrap_err().kind(), ErrorKind::InvalidValue);
    }
}
