use minish::Interpreter;

fn main() {
    let mut shell = Interpreter::default();
    let code = match shell.repl() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            -1
        }
    };
    std::process::exit(code);
}
