fn main() {
    if let Err(err) = ptreval::run() {
        eprintln!("{}", ptreval::format_error(&err));
        std::process::exit(1);
    }
}
