mod compiler_test;
mod parser_test;
mod protocol_test;
