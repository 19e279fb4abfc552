//! Static MCP prompts

use super::types::{PromptDefinition, PromptMessage, ToolContent};

const TOOLS_OVERVIEW: &str = "\
1. `eval_code(code)` - Evaluate Basilisp code and return the result
2. `execute_basilisp(code)` - Alias for eval_code
3. `get_docs(symbol)` - Get documentation for a Basilisp symbol
4. `find_namespace_vars(namespace)` - List all vars in a namespace
5. `list_namespaces()` - List all available namespaces
6. `check_connection()` - Check if the nREPL server is running and responding";

const LANGUAGE_BASICS: &str = "\
### Basic Operations
- Arithmetic: `(+ 1 2)`, `(- 10 5)`, `(* 3 4)`, `(/ 10 2)`
- Comparisons: `(= 1 1)`, `(< 5 10)`, `(> 7 2)`
- Logic: `(and true false)`, `(or false true)`, `(not true)`

### Variables and Functions
- Define a variable: `(def x 10)`
- Define a function: `(defn add [a b] (+ a b))`
- Anonymous function: `(fn [x] (* x x))` or `#(* % %)`

### Data Structures
- Lists: `(list 1 2 3)` or `'(1 2 3)`
- Vectors: `[1 2 3]`
- Maps: `{:a 1, :b 2}`
- Sets: `#{1 2 3}`

### Python Interop
- Import a module: `(import math)`
- Call a function: `(math/sqrt 16)`
- Access attributes: `(.-pi math)`
- Call methods: `(.method obj args)`
- Create Python objects: `#py {:a 1 :b 2}`

### Threading Macros
- Thread-first: `(-> x (f) (g))` inserts x as the first argument
- Thread-last: `(->> x (f) (g))` inserts x as the last argument";

const REPL_EXAMPLES: &str = "\
```clojure
(defn fibonacci [n]
  (loop [a 0 b 1 i 0]
    (if (= i n)
      a
      (recur b (+ a b) (inc i)))))

(map fibonacci (range 10))
;; => (0 1 1 2 3 5 8 13 21 34)
```";

const HELP_RESOURCES: &str = "\
## Resources
- For details on any function, use `get_docs`
- To see every var in a namespace, use `find_namespace_vars`
- To list all namespaces, use `list_namespaces`";

/// Prompts advertised by `prompts/list`
pub fn get_prompt_definitions() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: "basilisp-repl".to_string(),
            description: "Prompt for interacting with a Basilisp REPL".to_string(),
        },
        PromptDefinition {
            name: "basilisp-help".to_string(),
            description: "Helpful information about the Basilisp language".to_string(),
        },
    ]
}

/// Prompt body for `name`, if it exists
pub fn prompt_text(name: &str) -> Option<String> {
    match name {
        "basilisp-repl" => Some(format!(
            "You are now connected to a Basilisp REPL. Basilisp is a Lisp dialect similar to \
             Clojure, running on the Python VM.\n\n## Available Tools\n\n{}\n\n\
             ## Basilisp Help Guide\n\n{}\n\n## Examples\n\n{}\n",
            TOOLS_OVERVIEW, LANGUAGE_BASICS, REPL_EXAMPLES
        )),
        "basilisp-help" => Some(format!(
            "# Basilisp Help Guide\n\nBasilisp is a Lisp dialect similar to Clojure, running on \
             the Python VM.\n\n## Available Tools\n\n{}\n\n## Core Concepts\n\n{}\n\n{}\n",
            TOOLS_OVERVIEW, LANGUAGE_BASICS, HELP_RESOURCES
        )),
        _ => None,
    }
}

/// Messages for `prompts/get`
pub fn prompt_messages(name: &str) -> Option<Vec<PromptMessage>> {
    prompt_text(name).map(|text| {
        vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::text(text),
        }]
    })
}
