use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use gridsheet::clipboard::{ArboardClipboard, Clipboard};
use gridsheet::export::export_to_path;
use gridsheet::persist::{SheetId, SpreadsheetId};
use gridsheet::util::{display_width, parse_cell_ref};
use gridsheet::{Editor, EditorConfig, JsonFileStore, SheetStore};

struct Args {
    store_dir: PathBuf,
    config_path: Option<PathBuf>,
    sheet: Option<String>,
    command: Vec<String>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        store_dir: PathBuf::from("gridsheet-data"),
        config_path: None,
        sheet: None,
        command: Vec::new(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--store" | "-c" | "--config" | "--sheet" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires an argument", args[i]);
                    std::process::exit(1);
                }
                let value = args[i + 1].clone();
                match args[i].as_str() {
                    "-s" | "--store" => parsed.store_dir = PathBuf::from(value),
                    "-c" | "--config" => parsed.config_path = Some(PathBuf::from(value)),
                    _ => parsed.sheet = Some(value),
                }
                i += 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') && parsed.command.is_empty() => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                parsed.command.push(args[i].clone());
                i += 1;
            }
        }
    }

    parsed
}

/// Log panics before the default hook prints them
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        if let Some(location) = info.location() {
            error!(
                file = location.file(),
                line = location.line(),
                "panic occured"
            );
        } else {
            error!("panic occured");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

fn print_help() {
    eprintln!("gridsheet - Spreadsheet engine with a directory-backed store");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    gridsheet [OPTIONS] <COMMAND>");
    eprintln!();
    eprintln!("COMMANDS:");
    eprintln!("    new <NAME>                 Create a spreadsheet");
    eprintln!("    list                       List spreadsheets");
    eprintln!("    sheets <BOOK>              List the sheets of a spreadsheet");
    eprintln!("    add-sheet <BOOK> <NAME>    Add a sheet");
    eprintln!("    show <BOOK>                Print a sheet with formulas evaluated");
    eprintln!("    set <BOOK> <CELL> <VALUE>  Set a cell (e.g. B3) and save");
    eprintln!("    copy <BOOK> <CELL>         Copy a cell's raw value to the system clipboard");
    eprintln!("    export <BOOK> <FILE>       Write a sheet as .csv or .tsv");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -s, --store <DIR>    Store directory (default: gridsheet-data)");
    eprintln!("    -c, --config <FILE>  Editor config (TOML)");
    eprintln!("    --sheet <NAME>       Sheet to open (default: first sheet)");
    eprintln!("    -h, --help           Print this help message");
    eprintln!();
    eprintln!("BOOK is a spreadsheet id or name.");
}

/// Find a spreadsheet by id or by name
fn resolve_book(store: &JsonFileStore, key: &str) -> Result<SpreadsheetId, String> {
    if let Ok(id) = key.parse::<SpreadsheetId>() {
        return Ok(id);
    }
    store
        .list_spreadsheets()
        .map_err(|e| e.to_string())?
        .into_iter()
        .find(|s| s.name == key)
        .map(|s| s.id)
        .ok_or_else(|| format!("No spreadsheet named '{}'", key))
}

fn resolve_sheet(store: &JsonFileStore, book: SpreadsheetId, name: Option<&str>) -> Result<Option<SheetId>, String> {
    let Some(name) = name else {
        return Ok(None);
    };
    let data = store.fetch_sheet_data(book, None).map_err(|e| e.to_string())?;
    data.sheets
        .iter()
        .find(|s| s.name == name)
        .map(|s| Some(s.id))
        .ok_or_else(|| format!("No sheet named '{}'", name))
}

fn open_editor(args: &Args, store: JsonFileStore, book: &str) -> Result<Editor<JsonFileStore>, String> {
    let config = match &args.config_path {
        Some(path) => EditorConfig::from_file(path)?,
        None => EditorConfig::default(),
    };
    let book = resolve_book(&store, book)?;
    let sheet = resolve_sheet(&store, book, args.sheet.as_deref())?;
    Editor::open(store, book, sheet, config).map_err(|e| e.to_string())
}

/// Print the sheet as an aligned table with a row-number gutter
fn print_sheet(editor: &Editor<JsonFileStore>) {
    let grid = editor.grid();
    let mut table: Vec<Vec<String>> = Vec::with_capacity(grid.row_count() + 1);
    let mut header = vec![String::new()];
    header.extend(grid.columns().iter().map(|c| c.name.clone()));
    table.push(header);
    for r in 0..grid.row_count() {
        let mut line = vec![(r + 1).to_string()];
        line.extend((0..grid.column_count()).map(|c| {
            if grid.is_hidden(r, c) {
                String::new()
            } else {
                editor.display_value(r, c)
            }
        }));
        table.push(line);
    }

    let widths: Vec<usize> = (0..table[0].len())
        .map(|c| table.iter().map(|row| display_width(&row[c])).max().unwrap_or(0))
        .collect();
    for row in &table {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, &w)| format!("{}{}", value, " ".repeat(w - display_width(value))))
            .collect();
        println!("{}", cells.join(" | ").trim_end());
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut store = JsonFileStore::open(&args.store_dir).map_err(|e| e.to_string())?;
    let command: Vec<&str> = args.command.iter().map(|s| s.as_str()).collect();

    match command.as_slice() {
        ["new", name] => {
            let book = store.create_spreadsheet(name, "").map_err(|e| e.to_string())?;
            println!("{}", book.id);
        }
        ["list"] => {
            for book in store.list_spreadsheets().map_err(|e| e.to_string())? {
                println!("{}  {}  (updated {})", book.id, book.name, book.updated_at.format("%Y-%m-%d %H:%M"));
            }
        }
        ["sheets", book] => {
            let id = resolve_book(&store, book)?;
            let data = store.fetch_sheet_data(id, None).map_err(|e| e.to_string())?;
            for sheet in data.sheets {
                println!("{}  {}", sheet.order + 1, sheet.name);
            }
        }
        ["add-sheet", book, name] => {
            let id = resolve_book(&store, book)?;
            let sheet = store.add_sheet(id, name).map_err(|e| e.to_string())?;
            println!("{}", sheet.id);
        }
        ["show", book] => {
            let mut editor = open_editor(&args, store, book)?;
            print_sheet(&editor);
            if editor.is_dirty() {
                editor.save_now().map_err(|e| e.to_string())?;
            }
        }
        ["set", book, cell, value] => {
            let cell = parse_cell_ref(cell).ok_or_else(|| format!("Invalid cell reference: {}", cell))?;
            let mut editor = open_editor(&args, store, book)?;
            editor.set_cell(cell.row, cell.col, *value).map_err(|e| e.to_string())?;
            editor.save_now().map_err(|e| e.to_string())?;
            println!("{}", editor.display_value(cell.row, cell.col));
        }
        ["copy", book, cell] => {
            let cell = parse_cell_ref(cell).ok_or_else(|| format!("Invalid cell reference: {}", cell))?;
            let editor = open_editor(&args, store, book)?;
            let mut editor = editor.with_clipboard(Clipboard::with_system(Box::new(ArboardClipboard)));
            editor.select(cell.row, cell.col);
            let outcome = editor.copy();
            if !outcome.system {
                return Err("System clipboard unavailable".to_string());
            }
        }
        ["export", book, path] => {
            let editor = open_editor(&args, store, book)?;
            let path = PathBuf::from(path);
            export_to_path(editor.grid(), &path).map_err(|e| format!("Failed to export: {}", e))?;
            info!(path = %path.display(), "exported sheet");
        }
        [] => {
            print_help();
            return Err("No command given".to_string());
        }
        other => return Err(format!("Unknown command: {}", other.join(" "))),
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    install_panic_hook();

    let args = parse_args();
    info!(store = %args.store_dir.display(), "gridsheet started");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
